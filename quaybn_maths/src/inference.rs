//! Monte Carlo queries over a network: conditional distributions by
//! rejection and the likelihood of an evidence set.

use crate::err::QueryError;
use crate::model::BayesNet;
use crate::rng::SimRng;
use crate::sampling::{sample, Assignment, Evidence, ResolvedEvidence};

/// Floor applied to the estimated evidence probability before taking logs.
pub const LIKELIHOOD_FLOOR: f64 = 1e-10;

/// Estimated distribution of a target variable among the matching samples.
///
/// When no sample matched the evidence `probs` is empty and `matches` is 0;
/// callers decide what an unanswerable query means for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    pub probs: Vec<f64>,
    pub matches: usize,
}

impl Posterior {
    fn from_counts(counts: Vec<usize>, matches: usize) -> Posterior {
        if matches == 0 {
            return Posterior {
                probs: vec![],
                matches,
            };
        }
        let total = matches as f64;
        Posterior {
            probs: counts.into_iter().map(|c| c as f64 / total).collect(),
            matches,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Probability of a (one-based) state.
    pub fn prob(&self, state: usize) -> Option<f64> {
        if state == 0 {
            return None;
        }
        self.probs.get(state - 1).copied()
    }

    /// `Σ state · p(state)`, meaningful for ordinal variables.
    pub fn expected_value(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.probs
                .iter()
                .enumerate()
                .map(|(i, p)| (i + 1) as f64 * p)
                .sum(),
        )
    }
}

/// Draws `n` joint samples and returns the distribution of `target` among
/// the samples that agree with every evidence entry.
pub fn query_distribution(
    net: &BayesNet,
    target: &str,
    evidence: &Evidence,
    n: usize,
    rng: &mut SimRng,
) -> Result<Posterior, QueryError> {
    let mut res = query_many(net, &[target], evidence, n, rng)?;
    Ok(res.remove(0))
}

/// As [`query_distribution`], answering several targets from one set of draws.
/// The posteriors are returned in the order of `targets`.
pub fn query_many<S: AsRef<str>>(
    net: &BayesNet,
    targets: &[S],
    evidence: &Evidence,
    n: usize,
    rng: &mut SimRng,
) -> Result<Vec<Posterior>, QueryError> {
    let mut slots = Vec::with_capacity(targets.len());
    for t in targets {
        let t = t.as_ref();
        let node = net
            .node(t)
            .ok_or_else(|| QueryError::UnknownVariable(t.to_owned()))?;
        slots.push((node.pos(), vec![0_usize; node.k()]));
    }
    let evidence = evidence.resolve(net)?;

    let matches = draw_matching(net, &evidence, n, rng, |s| {
        for (pos, counts) in slots.iter_mut() {
            counts[s.get(*pos) - 1] += 1;
        }
    });
    if matches == 0 {
        log::debug!("no sample out of {} matched the evidence", n);
    }
    Ok(slots
        .into_iter()
        .map(|(_, counts)| Posterior::from_counts(counts, matches))
        .collect())
}

/// `ln P(evidence)` estimated as the fraction of `n` plain draws that match,
/// floored at [`LIKELIHOOD_FLOOR`].
pub fn log_likelihood(
    net: &BayesNet,
    evidence: &Evidence,
    n: usize,
    rng: &mut SimRng,
) -> Result<f64, QueryError> {
    let evidence = evidence.resolve(net)?;
    let matches = draw_matching(net, &evidence, n, rng, |_| {});
    let p = if n == 0 {
        0.0
    } else {
        matches as f64 / n as f64
    };
    Ok(p.max(LIKELIHOOD_FLOOR).ln())
}

fn draw_matching<F>(
    net: &BayesNet,
    evidence: &ResolvedEvidence,
    n: usize,
    rng: &mut SimRng,
    mut on_match: F,
) -> usize
where
    F: FnMut(&Assignment),
{
    let mut matches = 0;
    for _ in 0..n {
        let s = sample(net, rng);
        if evidence.matches(&s) {
            matches += 1;
            on_match(&s);
        }
    }
    matches
}
