mod categorical;
mod truncnormal;
mod weibull;

use crate::rng::SimRng;

pub use self::categorical::Categorical;
pub use self::truncnormal::TruncatedNormal;
pub use self::weibull::{mean_life, Weibull};

/// Draw a random variate from a (continuous) distribution.
pub trait Sample {
    fn sample(&self, rng: &mut SimRng) -> f64;
}

/// Compute the cumulative density function and its inverse for a given distribution.
pub trait CDF {
    fn cdf(&self, x: f64) -> f64;
    fn inverse_cdf(&self, p: f64) -> f64;
}
