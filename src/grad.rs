use crate::{Matrix, Network};

/// Gradient accumulator shaped like a network's parameters.
///
/// `dw` and `db` collect summed partial derivatives over one mini-batch and
/// are zeroed at the start of every training step. The `delta` columns are
/// per-sample scratch for the error signal the backward pass hands from each
/// layer to the one before it; they are overwritten sample by sample and
/// never averaged.
pub struct GradBuffer {
    pub(crate) dw: Vec<Matrix>,
    pub(crate) db: Vec<Matrix>,
    pub(crate) delta: Vec<Matrix>,
}

impl GradBuffer {
    /// Allocates an accumulator matching `net`'s layer shapes.
    pub fn for_net(net: &Network) -> Self {
        let arch = net.arch();
        let mut dw = Vec::with_capacity(arch.len() - 1);
        let mut db = Vec::with_capacity(arch.len() - 1);
        let mut delta = Vec::with_capacity(arch.len() - 1);
        for l in 0..arch.len() - 1 {
            dw.push(Matrix::new(arch[l + 1], arch[l]));
            db.push(Matrix::new(arch[l + 1], 1));
            delta.push(Matrix::new(arch[l + 1], 1));
        }
        Self { dw, db, delta }
    }

    pub fn n_layers(&self) -> usize {
        self.dw.len()
    }

    /// Zeroes the accumulated `dw` and `db`s. The `delta` scratch needs no
    /// clearing; the backward pass overwrites it for every sample.
    pub fn zero(&mut self) {
        for m in self.dw.iter_mut().chain(self.db.iter_mut()) {
            m.zero();
        }
    }
}
