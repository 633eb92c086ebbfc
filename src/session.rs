use log::{debug, trace};
use rand::rngs::StdRng;

use crate::{
    Error, GradBuffer, Network, Sample,
    train::{compute_cost, step_unchecked},
};

/// Initial reported cost, before the first full evaluation.
const COST_SENTINEL: f32 = 1.0;

/// Driver knobs for one training run.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Samples per training step.
    pub batch_size: usize,
    /// Learning rate.
    pub eta: f32,
    /// Training steps per [`Session::frame`] call.
    pub steps_per_frame: usize,
    /// Epochs between full-dataset cost refreshes.
    pub cost_every: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            batch_size: 8,
            eta: 0.3,
            steps_per_frame: 400,
            cost_every: 40,
        }
    }
}

/// Whether [`Session::frame`] advances training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Training,
    Paused,
}

/// One training run: network, gradient scratch, dataset and RNG, driven frame
/// by frame by the caller's render loop.
///
/// A session starts training as soon as it is constructed; there is no
/// separate arming step, since construction already requires the dataset.
/// Pausing stops [`Session::frame`] from doing work without touching
/// parameters, the epoch counter or the reported cost, and resuming picks up
/// where training left off. There is no terminal state; the caller simply
/// stops calling. An epoch is one frame of `steps_per_frame` training steps,
/// not a pass over the dataset.
pub struct Session<'a> {
    net: Network,
    grad: GradBuffer,
    samples: &'a [Sample],
    options: SessionOptions,
    state: RunState,
    epoch: usize,
    cost: f32,
    rng: StdRng,
}

impl<'a> Session<'a> {
    /// Validates the architecture and options, randomizes a fresh network and
    /// starts in [`RunState::Training`] with epoch 0 and the cost sentinel.
    pub fn new(
        arch: &[usize],
        samples: &'a [Sample],
        options: SessionOptions,
        mut rng: StdRng,
    ) -> Result<Self, Error> {
        if samples.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if options.batch_size < 1 {
            return Err(Error::BadBatchSize);
        }
        if !options.eta.is_finite() || options.eta <= 0.0 {
            return Err(Error::BadLearningRate);
        }
        if options.steps_per_frame < 1 || options.cost_every < 1 {
            return Err(Error::BadOptions);
        }
        let mut net = Network::new(arch)?;
        net.randomize(&mut rng);
        let grad = GradBuffer::for_net(&net);
        debug!(
            "session start: arch {arch:?}, {} samples, batch {}, eta {}",
            samples.len(),
            options.batch_size,
            options.eta,
        );
        Ok(Self {
            net,
            grad,
            samples,
            options,
            state: RunState::Training,
            epoch: 0,
            cost: COST_SENTINEL,
            rng,
        })
    }

    /// Runs one frame's worth of training steps and counts one epoch.
    ///
    /// Every `cost_every`-th epoch the reported cost is refreshed from the
    /// full dataset. Does nothing while paused; a frame in progress always
    /// runs to completion.
    pub fn frame(&mut self) {
        if self.state == RunState::Paused {
            return;
        }
        for _ in 0..self.options.steps_per_frame {
            step_unchecked(
                &mut self.net,
                &mut self.grad,
                self.samples,
                self.options.batch_size,
                self.options.eta,
                &mut self.rng,
            );
        }
        self.epoch += 1;
        if self.epoch % self.options.cost_every == 0 {
            self.cost = compute_cost(&mut self.net, self.samples);
            trace!("epoch {}: cost {:.6}", self.epoch, self.cost);
        }
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Training {
            self.state = RunState::Paused;
            debug!("paused at epoch {}", self.epoch);
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Training;
            debug!("resumed at epoch {}", self.epoch);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            RunState::Training => self.pause(),
            RunState::Paused => self.resume(),
        }
    }

    /// Re-randomizes the parameters and restarts the epoch counter and the
    /// reported cost. The training/paused state is kept as is.
    pub fn reset(&mut self) {
        self.net.randomize(&mut self.rng);
        self.epoch = 0;
        self.cost = COST_SENTINEL;
        debug!("reset");
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Mean squared error as of the last refresh, or the 1.0 sentinel before
    /// the first one.
    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn net(&self) -> &Network {
        &self.net
    }

    /// Mutable network access, for render callers evaluating
    /// [`Network::forward`] between frames.
    pub fn net_mut(&mut self) -> &mut Network {
        &mut self.net
    }
}
