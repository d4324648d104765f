use std::collections::BTreeMap;
use std::iter::FromIterator;

use super::Assignment;
use crate::err::QueryError;
use crate::model::BayesNet;

/// Observed states for a subset of the network variables.
///
/// Variables left out are unconstrained. States are one-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence(BTreeMap<String, usize>);

impl Evidence {
    pub fn new() -> Evidence {
        Evidence::default()
    }

    /// Adds an observation, builder style.
    pub fn with<S: Into<String>>(mut self, var: S, state: usize) -> Evidence {
        self.0.insert(var.into(), state);
        self
    }

    pub fn insert<S: Into<String>>(&mut self, var: S, state: usize) -> Option<usize> {
        self.0.insert(var.into(), state)
    }

    pub fn get(&self, var: &str) -> Option<usize> {
        self.0.get(var).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union of both observation sets; `other` wins on conflicting keys.
    pub fn merged(&self, other: &Evidence) -> Evidence {
        let mut merged = self.clone();
        for (k, v) in other.iter() {
            merged.insert(k, v);
        }
        merged
    }

    /// Binds the observations to node positions, checking every variable
    /// exists and every state is in range.
    pub fn resolve(&self, net: &BayesNet) -> Result<ResolvedEvidence, QueryError> {
        let mut resolved = Vec::with_capacity(self.0.len());
        for (var, &state) in &self.0 {
            let node = net
                .node(var)
                .ok_or_else(|| QueryError::UnknownVariable(var.clone()))?;
            if state == 0 || state > node.k() {
                return Err(QueryError::StateOutOfRange {
                    var: var.clone(),
                    state,
                    k: node.k(),
                });
            }
            resolved.push((node.pos(), state));
        }
        Ok(ResolvedEvidence(resolved))
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for Evidence {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Evidence {
        Evidence(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Evidence bound to the positions of a specific network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEvidence(Vec<(usize, usize)>);

impl ResolvedEvidence {
    /// Whether the sample agrees with every observation.
    #[inline]
    pub fn matches(&self, sample: &Assignment) -> bool {
        self.0.iter().all(|&(pos, state)| sample.get(pos) == state)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
