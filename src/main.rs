use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};

use pixfit::{Session, SessionOptions, sample_grid};

/// Trains a small feed-forward network to reproduce a procedural brightness
/// image from (x, y) coordinates and prints the learned function next to the
/// target.
#[derive(Debug, Parser)]
struct Args {
    /// Layer widths from input to output.
    #[arg(long, value_delimiter = ',', default_value = "2,32,32,1")]
    arch: Vec<usize>,

    /// Samples per training step.
    #[arg(long, default_value_t = 8)]
    batch_size: usize,

    /// Learning rate.
    #[arg(long, default_value_t = 0.3)]
    eta: f32,

    /// Training steps per frame.
    #[arg(long, default_value_t = 400)]
    steps_per_frame: usize,

    /// Epochs between cost refreshes.
    #[arg(long, default_value_t = 40)]
    cost_every: usize,

    /// Frames to drive.
    #[arg(long, default_value_t = 400)]
    frames: usize,

    /// Side length of the synthetic source image.
    #[arg(long, default_value_t = 24)]
    size: usize,

    /// RNG seed; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

/// A soft bright ring on a dark background. Enough structure that watching
/// the cost fall means something.
fn brightness(x: f32, y: f32) -> f32 {
    let dx = x - 0.5;
    let dy = y - 0.5;
    let r = (dx * dx + dy * dy).sqrt();
    (1.0 - (r - 0.3).abs() * 8.0).clamp(0.0, 1.0)
}

fn shade(v: f32) -> char {
    const RAMP: &[u8] = b" .:-=+*#%@";
    let i = (v.clamp(0.0, 1.0) * (RAMP.len() - 1) as f32).round() as usize;
    RAMP[i] as char
}

fn print_preview(session: &mut Session, size: usize) {
    println!("{:<width$}   {}", "target", "learned", width = size);
    for py in 0..size {
        let y = py as f32 / (size - 1) as f32;
        let mut line = String::with_capacity(size * 2 + 3);
        for px in 0..size {
            let x = px as f32 / (size - 1) as f32;
            line.push(shade(brightness(x, y)));
        }
        line.push_str("   ");
        for px in 0..size {
            let x = px as f32 / (size - 1) as f32;
            line.push(shade(session.net_mut().forward(x, y)));
        }
        println!("{line}");
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let samples = sample_grid(args.size, args.size, brightness);
    let options = SessionOptions {
        batch_size: args.batch_size,
        eta: args.eta,
        steps_per_frame: args.steps_per_frame,
        cost_every: args.cost_every,
    };
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut session = match Session::new(&args.arch, &samples, options, rng) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("pixfit: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "Training {:?} on a {}x{} image ({} samples)...",
        args.arch,
        args.size,
        args.size,
        samples.len()
    );
    let n_logs = args.frames.min(20).max(1);
    for frame in 0..args.frames {
        session.frame();
        // Log.
        if frame % (args.frames / n_logs).max(1) == 0 || frame + 1 == args.frames {
            let percentage = frame as f32 / args.frames as f32 * 100.0;
            println!(
                "[{percentage:.0}%] epoch {} cost {:.6}",
                session.epoch(),
                session.cost()
            );
        }
    }

    println!();
    print_preview(&mut session, args.size);
}
