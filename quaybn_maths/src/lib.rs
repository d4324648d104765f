//! Support mathematical methods for discrete Bayesian networks: distributions,
//! conditional probability tables, network assembly, ancestral and rejection
//! sampling, and Monte Carlo queries.

pub mod dists;
pub mod inference;
pub mod model;
pub mod sampling;

mod err;
mod rng;

/// Tolerance for a table row to count as summing to one.
pub const ROW_TOLERANCE: f64 = 1e-6;

pub use err::{DistError, ModelError, QueryError};
pub use rng::SimRng;
