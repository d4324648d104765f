use super::{Sample, CDF};
use crate::err::DistError;
use crate::rng::SimRng;

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Normal distribution truncated from below, used for repair times.
#[derive(Debug, Clone)]
pub struct TruncatedNormal {
    mu: f64,
    sigma: f64,
    lower: f64,
    std: Normal,
    // Φ(α) and 1 - Φ(α) with α = (lower - μ) / σ
    cdf_lower: f64,
    mass: f64,
}

impl TruncatedNormal {
    pub fn new(mu: f64, sigma: f64, lower: f64) -> Result<TruncatedNormal, DistError> {
        if !mu.is_finite() {
            return Err(DistError::Finite("mu"));
        }
        if !lower.is_finite() {
            return Err(DistError::Finite("lower"));
        }
        if !(sigma > 0.0) || !sigma.is_finite() {
            return Err(DistError::PositiveReal("sigma"));
        }
        let std = Normal::new(0.0, 1.0).map_err(|_| DistError::PositiveReal("sigma"))?;
        let alpha = (lower - mu) / sigma;
        let cdf_lower = std.cdf(alpha);
        Ok(TruncatedNormal {
            mu,
            sigma,
            lower,
            std,
            cdf_lower,
            mass: 1.0 - cdf_lower,
        })
    }

    /// Repair-time distribution: truncated to non-negative durations.
    pub fn non_negative(mu: f64, sigma: f64) -> Result<TruncatedNormal, DistError> {
        TruncatedNormal::new(mu, sigma, 0.0)
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// `μ + σ·φ(α) / (1 - Φ(α))`.
    pub fn mean(&self) -> f64 {
        if self.mass <= f64::MIN_POSITIVE {
            // all the parent mass lies below the bound
            return self.lower;
        }
        let alpha = (self.lower - self.mu) / self.sigma;
        self.mu + self.sigma * self.std.pdf(alpha) / self.mass
    }
}

impl Sample for TruncatedNormal {
    fn sample(&self, rng: &mut SimRng) -> f64 {
        let u = rng.uniform_pos();
        self.inverse_cdf(u)
    }
}

impl CDF for TruncatedNormal {
    fn cdf(&self, x: f64) -> f64 {
        if x <= self.lower {
            return 0.0;
        }
        let z = (x - self.mu) / self.sigma;
        ((self.std.cdf(z) - self.cdf_lower) / self.mass).min(1.0)
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        let q = (self.cdf_lower + p * self.mass).min(1.0 - f64::EPSILON);
        (self.mu + self.sigma * self.std.inverse_cdf(q)).max(self.lower)
    }
}
