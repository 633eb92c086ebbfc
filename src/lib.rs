mod activation;
mod dataset;
mod error;
mod grad;
mod matrix;
mod net;
mod session;
mod train;

pub use activation::*;
pub use dataset::*;
pub use error::*;
pub use grad::*;
pub use matrix::*;
pub use net::*;
pub use session::*;
pub use train::*;
