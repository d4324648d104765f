//! Conditional probability tables.
//!
//! Rows are laid out in mixed-radix order over the Cartesian product of the
//! parent states: the first declared parent varies slowest and the last one
//! fastest. For parents `P1` (k1 states) and `P2` (k2 states) the row for
//! `(P1 = i, P2 = j)` sits at `(i - 1)·k2 + (j - 1)`.

use itertools::Itertools;

use super::{Parent, Variable};
use crate::dists::Categorical;
use crate::err::{DistError, ErrMsg, ModelError};
use crate::ROW_TOLERANCE;

/// Conditional probability table for a discrete variable given its parents.
#[derive(Debug, Clone, PartialEq)]
pub struct CPT {
    var: String,
    k: usize,
    parents: Vec<Parent>,
    strides: Vec<usize>,
    rows: Vec<Categorical>,
}

impl CPT {
    /// Builds the table from explicit rows, given in mixed-radix order.
    pub fn from_rows(
        var: &Variable,
        parents: Vec<Parent>,
        rows: Vec<Vec<f64>>,
    ) -> Result<CPT, ModelError> {
        let expected = row_count(&parents);
        if rows.len() != expected {
            return Err(ModelError::RowCount {
                var: var.name().to_owned(),
                expected,
                found: rows.len(),
            });
        }
        if let Some(p) = parents.iter().find(|p| p.k() == 0) {
            return Err(ModelError::MalformedTable {
                var: var.name().to_owned(),
                reason: format!("parent `{}` has no states", p.name()),
            });
        }

        let mut table = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            table.push(validate_row(var, i, row)?);
        }
        Ok(CPT {
            var: var.name().to_owned(),
            k: var.k(),
            strides: strides(&parents),
            parents,
            rows: table,
        })
    }

    /// Variable name owning this table.
    pub fn var(&self) -> &str {
        &self.var
    }

    /// Number of states of the owning variable.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn parents(&self) -> &[Parent] {
        &self.parents
    }

    pub fn rows(&self) -> &[Categorical] {
        &self.rows
    }

    /// Linear position of the row for the given (one-based) parent states.
    pub fn row_index(&self, parent_states: &[usize]) -> usize {
        if parent_states.len() != self.parents.len() {
            panic!("{}", ErrMsg::StateIndex.panic_msg_with_arg(parent_states));
        }
        parent_states
            .iter()
            .zip(&self.parents)
            .zip(&self.strides)
            .map(|((&s, p), stride)| {
                if s == 0 || s > p.k() {
                    panic!("{}", ErrMsg::StateIndex.panic_msg_with_arg(parent_states));
                }
                (s - 1) * stride
            })
            .sum()
    }

    pub fn row_for(&self, parent_states: &[usize]) -> &Categorical {
        &self.rows[self.row_index(parent_states)]
    }
}

/// Builds a table by calling `row_gen` once per parent-state combination,
/// in mixed-radix order.
///
/// `parents` and `cardinalities` are parallel slices. Fails when a generated
/// row is not a valid distribution over the variable's states.
pub fn build_cpt<F>(
    var: &Variable,
    parents: &[&str],
    cardinalities: &[usize],
    mut row_gen: F,
) -> Result<CPT, ModelError>
where
    F: FnMut(&[usize]) -> Vec<f64>,
{
    if parents.len() != cardinalities.len() {
        return Err(ModelError::MalformedTable {
            var: var.name().to_owned(),
            reason: format!(
                "{} parents declared with {} cardinalities",
                parents.len(),
                cardinalities.len()
            ),
        });
    }
    let parents: Vec<Parent> = parents
        .iter()
        .zip(cardinalities)
        .map(|(name, &k)| Parent::new(*name, k))
        .collect();
    let rows = parent_combinations(cardinalities)
        .iter()
        .map(|states| row_gen(states))
        .collect();
    CPT::from_rows(var, parents, rows)
}

/// Every combination of one-based parent states, in mixed-radix order.
///
/// With no parents there is exactly one (empty) combination.
pub fn parent_combinations(cardinalities: &[usize]) -> Vec<Vec<usize>> {
    if cardinalities.is_empty() {
        return vec![vec![]];
    }
    cardinalities
        .iter()
        .map(|&k| 1..=k)
        .multi_cartesian_product()
        .collect()
}

/// Triangular weights over the states `1..=k` centred on a continuous
/// position, normalized to a distribution.
///
/// States further than `width` from `centre` get no mass; the state closest
/// to `centre` always gets some.
pub fn ordinal_kernel(k: usize, centre: f64, width: f64) -> Vec<f64> {
    let centre = centre.max(1.0).min(k as f64);
    let width = width.max(1.0);
    let weights: Vec<f64> = (1..=k)
        .map(|s| (1.0 - (s as f64 - centre).abs() / width).max(0.0))
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

fn row_count(parents: &[Parent]) -> usize {
    parents.iter().map(|p| p.k()).product()
}

fn strides(parents: &[Parent]) -> Vec<usize> {
    let mut strides = vec![1; parents.len()];
    for i in (0..parents.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * parents[i + 1].k();
    }
    strides
}

fn validate_row(var: &Variable, row: usize, probs: Vec<f64>) -> Result<Categorical, ModelError> {
    if probs.len() != var.k() {
        return Err(ModelError::RowWidth {
            var: var.name().to_owned(),
            row,
            expected: var.k(),
            found: probs.len(),
        });
    }
    Categorical::new(probs).map_err(|err| match err {
        DistError::NotNormalized(sum) => ModelError::RowNotNormalized {
            var: var.name().to_owned(),
            row,
            sum,
        },
        DistError::InvalidProbability(_) => ModelError::RowInvalidEntry {
            var: var.name().to_owned(),
            row,
        },
        other => ModelError::MalformedTable {
            var: var.name().to_owned(),
            reason: other.to_string(),
        },
    })
}

/// Checks a row sums to one within the table tolerance.
pub fn is_normalized(row: &[f64]) -> bool {
    (row.iter().sum::<f64>() - 1.0).abs() <= ROW_TOLERANCE
}
