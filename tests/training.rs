// End-to-end training behavior: configuration rejection, seeded convergence
// on a learnable pattern, and the XOR scenario.

use approx::assert_relative_eq;
use rand::{SeedableRng, rngs::StdRng};

use pixfit::{
    Error, GradBuffer, Network, RunState, Sample, Session, SessionOptions, compute_cost,
    sample_grid, train_step,
};

fn xor_samples() -> [Sample; 4] {
    [
        Sample::new(0.0, 0.0, 0.0),
        Sample::new(0.0, 1.0, 1.0),
        Sample::new(1.0, 0.0, 1.0),
        Sample::new(1.0, 1.0, 0.0),
    ]
}

#[test]
fn empty_dataset_leaves_parameters_untouched() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut net = Network::new(&[2, 8, 1]).unwrap();
    net.randomize(&mut rng);
    let mut grad = GradBuffer::for_net(&net);

    let before: Vec<_> = (0..net.n_layers())
        .map(|l| (net.weights(l).clone(), net.biases(l).clone()))
        .collect();

    let err = train_step(&mut net, &mut grad, &[], 8, 0.3, &mut rng);
    assert_eq!(err, Err(Error::EmptyDataset));

    for (l, (w, b)) in before.iter().enumerate() {
        assert_eq!(net.weights(l), w);
        assert_eq!(net.biases(l), b);
    }
}

#[test]
fn seeded_convergence_on_half_plane() {
    // target = 1 iff x > 0.5, a pattern a [2,32,32,1] stack learns quickly.
    let samples = sample_grid(8, 8, |x, _| if x > 0.5 { 1.0 } else { 0.0 });
    let mut rng = StdRng::seed_from_u64(7);
    let mut net = Network::new(&[2, 32, 32, 1]).unwrap();
    net.randomize(&mut rng);
    let mut grad = GradBuffer::for_net(&net);

    let initial = compute_cost(&mut net, &samples);
    for _ in 0..2_000 {
        train_step(&mut net, &mut grad, &samples, 8, 0.3, &mut rng).unwrap();
    }
    let after_2000 = compute_cost(&mut net, &samples);
    assert!(
        after_2000 < initial,
        "cost rose: {initial} -> {after_2000}"
    );

    let mut cost = after_2000;
    let mut steps = 2_000;
    while cost > 0.1 && steps < 20_000 {
        for _ in 0..1_000 {
            train_step(&mut net, &mut grad, &samples, 8, 0.3, &mut rng).unwrap();
        }
        steps += 1_000;
        cost = compute_cost(&mut net, &samples);
    }
    assert!(cost < 0.1, "cost still {cost} after {steps} steps");
}

#[test]
fn xor_end_to_end() {
    // Statistical: a 4-unit hidden layer can start with dead ReLU units, so a
    // handful of fixed seeds is allowed; each run follows the same recipe.
    let samples = xor_samples();
    let mut final_cost = f32::MAX;
    for seed in [2, 3, 5, 7, 11] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut net = Network::new(&[2, 4, 1]).unwrap();
        net.randomize(&mut rng);
        let mut grad = GradBuffer::for_net(&net);
        for _ in 0..5_000 {
            train_step(&mut net, &mut grad, &samples, 4, 0.3, &mut rng).unwrap();
        }
        final_cost = compute_cost(&mut net, &samples);
        if final_cost < 0.05 {
            break;
        }
    }
    assert!(final_cost < 0.05, "best cost over seeds: {final_cost}");
}

#[test]
fn predictions_stay_in_unit_interval_throughout_training() {
    let samples = sample_grid(6, 6, |x, y| (x + y) / 2.0);
    let mut rng = StdRng::seed_from_u64(13);
    let mut net = Network::new(&[2, 16, 1]).unwrap();
    net.randomize(&mut rng);
    let mut grad = GradBuffer::for_net(&net);

    for _ in 0..200 {
        train_step(&mut net, &mut grad, &samples, 8, 0.3, &mut rng).unwrap();
        let out = net.forward(0.3, 0.7);
        assert!((0.0..=1.0).contains(&out));
    }
}

#[test]
fn cost_of_perfect_predictions_is_zero() {
    // Zero parameters predict sigmoid(0) = 0.5 everywhere, which matches a
    // constant-0.5 target exactly.
    let samples = sample_grid(4, 4, |_, _| 0.5);
    let mut net = Network::new(&[2, 4, 1]).unwrap();
    assert_relative_eq!(compute_cost(&mut net, &samples), 0.0, epsilon = 1e-9);
}

#[test]
fn session_drives_training_like_a_frame_loop() {
    let samples = sample_grid(6, 6, |x, _| x);
    let options = SessionOptions {
        batch_size: 8,
        eta: 0.3,
        steps_per_frame: 50,
        cost_every: 4,
    };
    let mut session = Session::new(
        &[2, 16, 1],
        &samples,
        options,
        StdRng::seed_from_u64(19),
    )
    .unwrap();

    assert_eq!(session.state(), RunState::Training);
    assert_eq!(session.cost(), 1.0);

    for _ in 0..8 {
        session.frame();
    }
    assert_eq!(session.epoch(), 8);
    let cost = session.cost();
    assert!(cost < 1.0);

    session.pause();
    session.frame();
    assert_eq!(session.epoch(), 8);
    assert_eq!(session.cost(), cost);

    session.reset();
    assert_eq!(session.epoch(), 0);
    assert_eq!(session.cost(), 1.0);
    assert_eq!(session.state(), RunState::Paused);
}
