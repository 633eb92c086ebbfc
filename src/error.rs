use derive_more::{Display, Error};

/// Configuration errors, all detected before any computation starts.
///
/// A failed call applies nothing. Shape mismatches between matrix operands
/// are not represented here; they are construction bugs and panic in the
/// matrix primitives instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum Error {
    #[display("architecture must list at least two positive layer widths")]
    BadArchitecture,
    #[display("dataset must contain at least one sample")]
    EmptyDataset,
    #[display("batch size must be at least 1")]
    BadBatchSize,
    #[display("learning rate must be positive and finite")]
    BadLearningRate,
    #[display("steps per frame and cost interval must be at least 1")]
    BadOptions,
}
