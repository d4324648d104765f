use crate::err::DistError;
use crate::rng::SimRng;
use crate::ROW_TOLERANCE;

use float_cmp::approx_eq;

/// A discrete categorical distribution over the ordered states `1..=k`.
///
/// States are labelled from one, matching how evidence and table rows refer
/// to them; `pmf(1)` is the probability of the first (lowest) state.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    event_prob: Vec<f64>,
    cdf: Vec<f64>,
}

impl Categorical {
    /// Takes the probability of each state and returns the distribution.
    ///
    /// Every entry must be finite and non-negative and the entries must sum
    /// to one within the row tolerance.
    pub fn new(categories: Vec<f64>) -> Result<Categorical, DistError> {
        if categories.is_empty() {
            return Err(DistError::NoCategories);
        }
        if let Some(&p) = categories.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(DistError::InvalidProbability(p));
        }
        let sum: f64 = categories.iter().sum();
        if !approx_eq!(f64, sum, 1.0, epsilon = ROW_TOLERANCE) {
            return Err(DistError::NotNormalized(sum));
        }
        Ok(Categorical::with_cdf(categories))
    }

    /// Normalizes a vector of non-negative weights into a distribution.
    pub fn from_weights(weights: Vec<f64>) -> Result<Categorical, DistError> {
        if weights.is_empty() {
            return Err(DistError::NoCategories);
        }
        if let Some(&w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(DistError::InvalidProbability(w));
        }
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return Err(DistError::NotNormalized(sum));
        }
        Ok(Categorical::with_cdf(
            weights.into_iter().map(|w| w / sum).collect(),
        ))
    }

    /// Every state equally likely.
    ///
    /// # Panics
    /// When `k` is zero.
    pub fn uniform(k: usize) -> Categorical {
        if k == 0 {
            panic!("quaybn: a uniform distribution needs at least one state");
        }
        Categorical::with_cdf(vec![1.0 / k as f64; k])
    }

    /// All the mass on a single state.
    pub fn point_mass(k: usize, state: usize) -> Result<Categorical, DistError> {
        if state == 0 || state > k {
            return Err(DistError::StateOutOfRange { state, k });
        }
        let mut probs = vec![0.0; k];
        probs[state - 1] = 1.0;
        Ok(Categorical::with_cdf(probs))
    }

    fn with_cdf(event_prob: Vec<f64>) -> Categorical {
        let mut cdf = Vec::with_capacity(event_prob.len());
        let mut acc = 0.0;
        for p in &event_prob {
            acc += p;
            cdf.push(acc);
        }
        // absorb rounding so the last state always closes the interval
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }
        Categorical { event_prob, cdf }
    }

    /// Draws a state (one-based).
    #[inline]
    pub fn sample(&self, rng: &mut SimRng) -> usize {
        let val = rng.uniform_pos();
        self.cdf.partition_point(|&c| c < val) + 1
    }

    #[inline]
    pub fn pmf(&self, state: usize) -> f64 {
        if state == 0 || state > self.event_prob.len() {
            panic!(
                "quaybn: index out of bounds; the number of states for this random variable \
                 are `{}`, state provided was `{}`",
                self.event_prob.len(),
                state
            )
        }
        self.event_prob[state - 1]
    }

    #[inline]
    pub fn cmf(&self, state: usize) -> f64 {
        if state == 0 || state > self.cdf.len() {
            panic!(
                "quaybn: index out of bounds; the number of states for this random variable \
                 are `{}`, state provided was `{}`",
                self.cdf.len(),
                state
            )
        }
        self.cdf[state - 1]
    }

    #[inline]
    pub fn k_num(&self) -> usize {
        self.event_prob.len()
    }

    pub fn probs(&self) -> &[f64] {
        &self.event_prob
    }

    /// `Σ state · p(state)` over the one-based states.
    pub fn expected_value(&self) -> f64 {
        self.event_prob
            .iter()
            .enumerate()
            .map(|(i, p)| (i + 1) as f64 * p)
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_bad_rows() {
        assert_eq!(Categorical::new(vec![]), Err(DistError::NoCategories));
        assert!(matches!(
            Categorical::new(vec![0.5, 0.6]),
            Err(DistError::NotNormalized(_))
        ));
        assert!(matches!(
            Categorical::new(vec![1.2, -0.2]),
            Err(DistError::InvalidProbability(_))
        ));
        assert!(matches!(
            Categorical::new(vec![f64::NAN, 1.0]),
            Err(DistError::InvalidProbability(_))
        ));
        assert!(Categorical::new(vec![0.3, 0.3, 0.4 + 5e-7]).is_ok());
    }

    #[test]
    fn deterministic_rows_never_leave_their_state() {
        let mut rng = SimRng::new(3);
        let not_operable = Categorical::new(vec![0.0, 1.0]).unwrap();
        let middle = Categorical::point_mass(5, 3).unwrap();
        for _ in 0..5_000 {
            assert_eq!(not_operable.sample(&mut rng), 2);
            assert_eq!(middle.sample(&mut rng), 3);
        }
    }

    #[test]
    fn zero_mass_states_are_skipped() {
        let mut rng = SimRng::new(5);
        let cat = Categorical::new(vec![0.5, 0.0, 0.5]).unwrap();
        for _ in 0..5_000 {
            assert_ne!(cat.sample(&mut rng), 2);
        }
    }

    #[test]
    fn frequencies_follow_pmf() {
        let mut rng = SimRng::new(17);
        let cat = Categorical::new(vec![0.2, 0.5, 0.3]).unwrap();
        let mut counts = [0usize; 3];
        let n = 100_000;
        for _ in 0..n {
            counts[cat.sample(&mut rng) - 1] += 1;
        }
        for (state, c) in counts.iter().enumerate() {
            let freq = *c as f64 / n as f64;
            assert!((freq - cat.pmf(state + 1)).abs() < 0.01);
        }
        assert!((cat.cmf(2) - 0.7).abs() < 1e-12);
        assert!((cat.expected_value() - 2.1).abs() < 1e-12);
    }

    #[test]
    fn weights_are_normalized() {
        let cat = Categorical::from_weights(vec![1.0, 3.0]).unwrap();
        assert_eq!(cat.probs(), &[0.25, 0.75]);
        assert!(Categorical::from_weights(vec![0.0, 0.0]).is_err());
        let uni = Categorical::uniform(4);
        assert!((uni.pmf(4) - 0.25).abs() < 1e-12);
    }
}
