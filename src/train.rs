use std::iter;

use log::trace;
use rand::Rng;

use crate::{
    Error, GradBuffer, Network, Sample,
    activation::{relu_deriv, sigmoid_deriv},
};

/// One online mini-batch step of stochastic gradient descent.
///
/// Draws `batch_size` samples uniformly with replacement, runs forward and
/// backward passes while summing gradients into `grad`, then applies the
/// averaged update `param -= (eta / batch_size) · grad` once. `grad` must be
/// shaped for `net` (see [`GradBuffer::for_net`]).
///
/// Configuration problems are rejected before any computation, leaving the
/// network untouched. Divergence under an oversized learning rate is not
/// guarded; NaN would propagate like any other value.
pub fn train_step(
    net: &mut Network,
    grad: &mut GradBuffer,
    samples: &[Sample],
    batch_size: usize,
    eta: f32,
    rng: &mut impl Rng,
) -> Result<(), Error> {
    if samples.is_empty() {
        return Err(Error::EmptyDataset);
    }
    if batch_size < 1 {
        return Err(Error::BadBatchSize);
    }
    if !eta.is_finite() || eta <= 0.0 {
        return Err(Error::BadLearningRate);
    }
    step_unchecked(net, grad, samples, batch_size, eta, rng);
    Ok(())
}

/// The validated step body, shared with the session driver.
pub(crate) fn step_unchecked(
    net: &mut Network,
    grad: &mut GradBuffer,
    samples: &[Sample],
    batch_size: usize,
    eta: f32,
    rng: &mut impl Rng,
) {
    grad.zero();
    for _ in 0..batch_size {
        let sample = samples[rng.random_range(0..samples.len())];
        let pred = net.forward(sample.x, sample.y);
        back_propagate_sample(net, grad, pred, sample.target);
    }
    apply_grads(net, grad, eta / batch_size as f32);
    trace!("step applied, batch {batch_size}, eta {eta}");
}

/// Accumulates one sample's gradients, reading the activations the forward
/// pass just cached.
///
/// The output error is `(pred - target) · pred · (1 - pred)`, the squared
/// error derivative through the sigmoid output unit. Walking output to input,
/// every unit's error is its incoming delta gated by the layer's activation
/// derivative, and the previous layer's delta column is rebuilt as the
/// weight-weighted sum over all units of the current layer.
fn back_propagate_sample(net: &Network, grad: &mut GradBuffer, pred: f32, target: f32) {
    let n_layers = net.weights.len();
    let out = grad.delta[n_layers - 1].as_mut_slice();
    out.fill(0.0);
    out[0] = (pred - target) * sigmoid_deriv(pred);
    for l in (0..n_layers).rev() {
        let is_output = l + 1 == n_layers;
        let a_prev = net.acts[l].as_slice();
        let a = net.acts[l + 1].as_slice();
        let w = &net.weights[l];
        let dw = &mut grad.dw[l];
        let db = grad.db[l].as_mut_slice();
        let (delta_head, delta_tail) = grad.delta.split_at_mut(l);
        let delta = delta_tail[0].as_slice();
        let mut delta_prev = match l {
            0 => None,
            _ => Some(delta_head[l - 1].as_mut_slice()),
        };
        // The previous layer's column is per-sample scratch, summed below.
        if let Some(dp) = &mut delta_prev {
            dp.fill(0.0);
        }
        for j in 0..a.len() {
            let gate = if is_output { 1.0 } else { relu_deriv(a[j]) };
            let delta_j = delta[j] * gate;
            db[j] += delta_j;
            for i in 0..a_prev.len() {
                dw[(j, i)] += delta_j * a_prev[i];
                if let Some(dp) = &mut delta_prev {
                    dp[i] += delta_j * w[(j, i)];
                }
            }
        }
    }
}

fn apply_grads(net: &mut Network, grad: &GradBuffer, scale: f32) {
    for l in 0..net.weights.len() {
        for (p, dp) in iter::zip(net.weights[l].as_mut_slice(), grad.dw[l].as_slice()) {
            *p -= scale * dp;
        }
        for (p, dp) in iter::zip(net.biases[l].as_mut_slice(), grad.db[l].as_slice()) {
            *p -= scale * dp;
        }
    }
}

/// Mean squared error of the network over the whole dataset.
///
/// Runs one forward pass per sample, so the cost is proportional to the
/// dataset size; call it periodically, not every step. Only the activation
/// caches are mutated. An empty dataset reports zero.
pub fn compute_cost(net: &mut Network, samples: &[Sample]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0f32;
    for s in samples {
        let pred = net.forward(s.x, s.y);
        sum += (pred - s.target).powi(2);
    }
    sum / samples.len() as f32
}
