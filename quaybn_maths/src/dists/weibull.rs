use super::{Sample, CDF};
use crate::err::DistError;
use crate::rng::SimRng;

use statrs::function::gamma::gamma;

/// Two-parameter Weibull life distribution, `F(t) = 1 - exp(-(t/η)^β)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weibull {
    shape: f64,
    scale: f64,
}

impl Weibull {
    pub fn new(shape: f64, scale: f64) -> Result<Weibull, DistError> {
        if !(shape > 0.0) || !shape.is_finite() {
            return Err(DistError::PositiveReal("shape"));
        }
        if !(scale > 0.0) || !scale.is_finite() {
            return Err(DistError::PositiveReal("scale"));
        }
        Ok(Weibull { shape, scale })
    }

    #[inline]
    pub fn shape(&self) -> f64 {
        self.shape
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Mean life, `η·Γ(1 + 1/β)`.
    pub fn mean(&self) -> f64 {
        mean_life(self.shape, self.scale)
    }

    /// Failure rate at age `t`.
    pub fn hazard(&self, t: f64) -> f64 {
        (self.shape / self.scale) * (t / self.scale).powf(self.shape - 1.0)
    }

    /// Expected number of failures over `[0, t]` under minimal repair.
    pub fn cumulative_hazard(&self, t: f64) -> f64 {
        (t / self.scale).powf(self.shape)
    }
}

/// `η·Γ(1 + 1/β)`; the mean time between failures for a renewed unit.
pub fn mean_life(shape: f64, scale: f64) -> f64 {
    scale * gamma(1.0 + 1.0 / shape)
}

impl Sample for Weibull {
    #[inline]
    fn sample(&self, rng: &mut SimRng) -> f64 {
        let u = rng.uniform_pos();
        self.inverse_cdf(u)
    }
}

impl CDF for Weibull {
    #[inline]
    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        1.0 - (-(x / self.scale).powf(self.shape)).exp()
    }

    #[inline]
    fn inverse_cdf(&self, p: f64) -> f64 {
        self.scale * (-(1.0 - p).ln()).powf(1.0 / self.shape)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exponential_special_case() {
        let w = Weibull::new(1.0, 250.0).unwrap();
        assert!((w.mean() - 250.0).abs() < 1e-9);
        assert!((w.hazard(10.0) - 1.0 / 250.0).abs() < 1e-12);
        assert!((w.cumulative_hazard(500.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rayleigh_mean() {
        // Γ(1.5) = √π / 2
        let w = Weibull::new(2.0, 100.0).unwrap();
        let expected = 100.0 * std::f64::consts::PI.sqrt() / 2.0;
        assert!((w.mean() - expected).abs() < 1e-9);
    }

    #[test]
    fn quantiles_invert_cdf() {
        let w = Weibull::new(1.7, 900.0).unwrap();
        for &p in &[0.05, 0.5, 0.95] {
            assert!((w.cdf(w.inverse_cdf(p)) - p).abs() < 1e-12);
        }
        assert!(Weibull::new(0.0, 1.0).is_err());
        assert!(Weibull::new(1.0, f64::NAN).is_err());
    }

    #[test]
    fn sample_mean() {
        let w = Weibull::new(1.5, 400.0).unwrap();
        let mut rng = SimRng::new(23);
        let n = 50_000;
        let mean = (0..n).map(|_| w.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!((mean - w.mean()).abs() / w.mean() < 0.02);
    }
}
