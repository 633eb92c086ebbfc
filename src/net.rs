use log::debug;
use rand::Rng;

use crate::{
    Error, Matrix,
    activation::{relu, sigmoid},
};

/// A feed-forward stack of affine layers with fixed nonlinearities: ReLU on
/// every hidden layer, sigmoid on the output layer.
///
/// `arch` lists layer widths from input to output. For each layer `l` the
/// weights are `arch[l+1] × arch[l]`, the biases `arch[l+1] × 1`, and one
/// activation column of width `arch[l]` is cached per layer, the input
/// included. The caches always hold the values of the most recent
/// [`Network::forward`] call.
pub struct Network {
    pub(crate) arch: Box<[usize]>,
    pub(crate) weights: Vec<Matrix>,
    pub(crate) biases: Vec<Matrix>,
    pub(crate) acts: Vec<Matrix>,
}

impl Network {
    /// Builds a zero-parameter network. Call [`Network::randomize`] before
    /// training.
    pub fn new(arch: &[usize]) -> Result<Self, Error> {
        if arch.len() < 2 || arch.iter().any(|&n| n == 0) {
            return Err(Error::BadArchitecture);
        }
        let mut weights = Vec::with_capacity(arch.len() - 1);
        let mut biases = Vec::with_capacity(arch.len() - 1);
        let mut acts = Vec::with_capacity(arch.len());
        acts.push(Matrix::new(arch[0], 1));
        for l in 0..arch.len() - 1 {
            weights.push(Matrix::new(arch[l + 1], arch[l]));
            biases.push(Matrix::new(arch[l + 1], 1));
            acts.push(Matrix::new(arch[l + 1], 1));
        }
        debug!("new network, arch {arch:?}");
        Ok(Self {
            arch: arch.into(),
            weights,
            biases,
            acts,
        })
    }

    pub fn arch(&self) -> &[usize] {
        &self.arch
    }

    /// Number of weight layers (`arch.len() - 1`).
    pub fn n_layers(&self) -> usize {
        self.weights.len()
    }

    /// Draws fresh parameters: weights uniform in `±√(2/fan_in)` where
    /// `fan_in = arch[l]`, biases uniform in `±0.1`. The He-style scale keeps
    /// pre-activation variance stable through the ReLU layers. Cached
    /// activations are left alone.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        for l in 0..self.weights.len() {
            let fan_in = self.arch[l] as f32;
            let limit = (2.0 / fan_in).sqrt();
            self.weights[l].randomize(rng, -limit..limit);
            self.biases[l].randomize(rng, -0.1..0.1);
        }
    }

    /// Evaluates the network at one coordinate pair and returns the brightness
    /// prediction from output unit 0.
    ///
    /// Overwrites every cached activation. Anything that reads the caches,
    /// backpropagation or a render caller introspecting the layers, must do so
    /// before the next forward pass; no history is kept.
    pub fn forward(&mut self, x: f32, y: f32) -> f32 {
        assert!(
            self.arch[0] == 2,
            "shape mismatch in forward: input width is {}, needs 2",
            self.arch[0],
        );
        let a_0 = self.acts[0].as_mut_slice();
        a_0[0] = x;
        a_0[1] = y;
        let n_layers = self.weights.len();
        for l in 0..n_layers {
            let (head, tail) = self.acts.split_at_mut(l + 1);
            let a_prev = &head[l];
            let a = &mut tail[0];
            Matrix::matmul(a, &self.weights[l], a_prev);
            a.add(&self.biases[l]);
            let squash: fn(f32) -> f32 = if l + 1 == n_layers { sigmoid } else { relu };
            for v in a.as_mut_slice() {
                *v = squash(*v);
            }
        }
        self.acts[n_layers].as_slice()[0]
    }

    /// Cached activation column of layer `l`, where 0 is the input layer.
    pub fn act(&self, l: usize) -> &Matrix {
        &self.acts[l]
    }

    /// Weight matrix of layer `l`.
    pub fn weights(&self, l: usize) -> &Matrix {
        &self.weights[l]
    }

    /// Bias column of layer `l`.
    pub fn biases(&self, l: usize) -> &Matrix {
        &self.biases[l]
    }
}
