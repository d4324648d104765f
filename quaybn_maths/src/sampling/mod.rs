//! Forward (ancestral) sampling of a discrete network and rejection
//! sampling under evidence.
//!
//! Every node is visited once, in the network's stored order, and drawn from
//! the row selected by its already-sampled parents. Conditioning is done by
//! discarding draws that disagree with the evidence, which has no bound on
//! the number of draws when the evidence is improbable; [`SamplerConfig`]
//! caps it.

mod evidence;

use smallvec::SmallVec;

pub use self::evidence::{Evidence, ResolvedEvidence};

use crate::err::{ErrMsg, QueryError};
use crate::model::BayesNet;
use crate::rng::SimRng;

/// Draws tried in the first rejection pass: `max(2n, MIN_FIRST_PASS)`.
const MIN_FIRST_PASS: usize = 1000;
const DEFAULT_MAX_DRAWS: usize = 10_000_000;

/// A full joint draw: one state (one-based) per node, indexed by node position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment(Vec<usize>);

impl Assignment {
    #[inline]
    pub fn get(&self, pos: usize) -> usize {
        self.0[pos]
    }

    /// State of a variable by name, if the variable is part of the network.
    pub fn state_of(&self, net: &BayesNet, var: &str) -> Option<usize> {
        net.position(var).map(|pos| self.0[pos])
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

/// Limits applied to rejection sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Total draws allowed to collect the matching samples. `None` keeps
    /// drawing until enough samples match, which blocks forever when the
    /// evidence has (near) zero probability.
    pub max_draws: Option<usize>,
}

impl Default for SamplerConfig {
    fn default() -> SamplerConfig {
        SamplerConfig {
            max_draws: Some(DEFAULT_MAX_DRAWS),
        }
    }
}

impl SamplerConfig {
    pub fn unbounded() -> SamplerConfig {
        SamplerConfig { max_draws: None }
    }

    pub fn with_max_draws(max_draws: usize) -> SamplerConfig {
        SamplerConfig {
            max_draws: Some(max_draws),
        }
    }
}

/// Draws one joint assignment by ancestral sampling.
pub fn sample(net: &BayesNet, rng: &mut SimRng) -> Assignment {
    // zero marks a node not drawn yet
    let mut states = vec![0_usize; net.var_num()];
    let mut parent_states: SmallVec<[usize; 8]> = SmallVec::new();
    for node in net.iter_vars() {
        parent_states.clear();
        for &p in node.parents_positions() {
            let s = states[p];
            if s == 0 {
                panic!(
                    "{}",
                    ErrMsg::UnsampledParent.panic_msg_with_arg(net.node_at(p).name())
                );
            }
            parent_states.push(s);
        }
        states[node.pos()] = node.cpd().sample_given(&parent_states, rng);
    }
    Assignment(states)
}

/// Draws `n` joint assignments.
///
/// Without evidence (or with empty evidence) these are `n` independent
/// draws. With evidence, a first pass of `max(2n, 1000)` draws is filtered,
/// then drawing continues one at a time until `n` samples match. Once the
/// total reaches `config.max_draws` the call fails with
/// [`QueryError::Timeout`].
pub fn sample_batch(
    net: &BayesNet,
    n: usize,
    evidence: Option<&Evidence>,
    config: &SamplerConfig,
    rng: &mut SimRng,
) -> Result<Vec<Assignment>, QueryError> {
    let evidence = match evidence {
        Some(ev) if !ev.is_empty() => ev.resolve(net)?,
        _ => return Ok((0..n).map(|_| sample(net, rng)).collect()),
    };

    let mut matched = Vec::with_capacity(n);
    let first_pass = (2 * n).max(MIN_FIRST_PASS);
    let first_pass = config.max_draws.map_or(first_pass, |cap| first_pass.min(cap));
    let mut draws = 0;
    while draws < first_pass && matched.len() < n {
        let s = sample(net, rng);
        draws += 1;
        if evidence.matches(&s) {
            matched.push(s);
        }
    }
    log::debug!(
        "rejection first pass: {} of {} draws matched ({} wanted)",
        matched.len(),
        draws,
        n
    );

    while matched.len() < n {
        if let Some(cap) = config.max_draws {
            if draws >= cap {
                log::warn!(
                    "rejection sampling stopped at {} draws with {} of {} matches",
                    draws,
                    matched.len(),
                    n
                );
                return Err(QueryError::Timeout {
                    draws,
                    matches: matched.len(),
                    wanted: n,
                });
            }
        }
        let s = sample(net, rng);
        draws += 1;
        if evidence.matches(&s) {
            matched.push(s);
        }
    }
    Ok(matched)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dists::Categorical;
    use crate::model::{assemble, build_cpt, Cpd, Variable};
    use std::collections::HashMap;

    /// a ~ [0.9, 0.1]; b copies a.
    fn copy_net() -> BayesNet {
        let mut cpds = HashMap::new();
        cpds.insert(
            "a".to_owned(),
            Cpd::from(Categorical::new(vec![0.9, 0.1]).unwrap()),
        );
        let b = build_cpt(&Variable::new("b", 2), &["a"], &[2], |s| {
            if s[0] == 1 {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            }
        })
        .unwrap();
        cpds.insert("b".to_owned(), Cpd::from(b));
        assemble(cpds, &["a", "b"]).unwrap()
    }

    #[test]
    fn ancestral_sample_follows_parents() {
        let net = copy_net();
        let mut rng = SimRng::new(42);
        for _ in 0..2_000 {
            let s = sample(&net, &mut rng);
            assert_eq!(s.get(0), s.get(1));
            assert_eq!(s.state_of(&net, "b"), Some(s.get(0)));
        }
    }

    #[test]
    fn batch_without_evidence() {
        let net = copy_net();
        let mut rng = SimRng::new(1);
        let batch = sample_batch(&net, 500, None, &SamplerConfig::default(), &mut rng).unwrap();
        assert_eq!(batch.len(), 500);
        let empty = Evidence::new();
        let batch =
            sample_batch(&net, 10, Some(&empty), &SamplerConfig::default(), &mut rng).unwrap();
        assert_eq!(batch.len(), 10);
    }

    #[test]
    fn batch_with_evidence_only_keeps_matches() {
        let net = copy_net();
        let mut rng = SimRng::new(2);
        let ev = Evidence::new().with("b", 2);
        // about 10% match: the first pass of 2000 draws is not enough for 400
        let batch = sample_batch(&net, 400, Some(&ev), &SamplerConfig::default(), &mut rng).unwrap();
        assert_eq!(batch.len(), 400);
        assert!(batch.iter().all(|s| s.get(0) == 2 && s.get(1) == 2));
    }

    #[test]
    fn impossible_evidence_times_out() {
        let net = copy_net();
        let mut rng = SimRng::new(3);
        let ev = Evidence::new().with("a", 1).with("b", 2);
        let err = sample_batch(&net, 5, Some(&ev), &SamplerConfig::with_max_draws(5_000), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::Timeout {
                draws: 5_000,
                matches: 0,
                wanted: 5
            }
        ));
    }

    #[test]
    fn evidence_is_validated() {
        let net = copy_net();
        let mut rng = SimRng::new(4);
        let cfg = SamplerConfig::default();
        let ev = Evidence::new().with("z", 1);
        assert!(matches!(
            sample_batch(&net, 1, Some(&ev), &cfg, &mut rng),
            Err(QueryError::UnknownVariable(_))
        ));
        let ev = Evidence::new().with("a", 3);
        assert!(matches!(
            sample_batch(&net, 1, Some(&ev), &cfg, &mut rng),
            Err(QueryError::StateOutOfRange { state: 3, k: 2, .. })
        ));
    }

    #[test]
    fn reseeding_reproduces_the_batch() {
        let net = copy_net();
        let cfg = SamplerConfig::default();
        let a = sample_batch(&net, 200, None, &cfg, &mut SimRng::new(9)).unwrap();
        let b = sample_batch(&net, 200, None, &cfg, &mut SimRng::new(9)).unwrap();
        assert_eq!(a, b);
    }
}
