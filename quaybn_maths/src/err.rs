//! Error types and messages for panic calls.
use std::fmt::Debug;

/// Failures while building tables or assembling a network. These are
/// configuration errors and abort assembly.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("malformed table for `{var}`: expected {expected} rows, found {found}")]
    RowCount {
        var: String,
        expected: usize,
        found: usize,
    },
    #[error("malformed table for `{var}`: row {row} has {found} entries, expected {expected}")]
    RowWidth {
        var: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("malformed table for `{var}`: row {row} sums to {sum}")]
    RowNotNormalized { var: String, row: usize, sum: f64 },
    #[error("malformed table for `{var}`: row {row} has a negative or non-finite entry")]
    RowInvalidEntry { var: String, row: usize },
    #[error("malformed table for `{var}`: {reason}")]
    MalformedTable { var: String, reason: String },
    #[error("node `{node}` references parent `{parent}` which was not assembled before it")]
    UnknownParent { node: String, parent: String },
    #[error(
        "node `{node}` declares {declared} states for parent `{parent}`, \
         but the parent has {actual}"
    )]
    ParentCardinality {
        node: String,
        parent: String,
        declared: usize,
        actual: usize,
    },
    #[error("node `{0}` was assembled twice")]
    DuplicateNode(String),
    #[error(transparent)]
    Dist(#[from] DistError),
}

/// Invalid distribution parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistError {
    #[error("a categorical distribution requires at least one category")]
    NoCategories,
    #[error("probability {0} is negative or not finite")]
    InvalidProbability(f64),
    #[error("probabilities sum to {0}, expected 1")]
    NotNormalized(f64),
    #[error("state {state} is outside 1..={k}")]
    StateOutOfRange { state: usize, k: usize },
    #[error("expected a positive real number for `{0}`")]
    PositiveReal(&'static str),
    #[error("expected a non-negative real number for `{0}`")]
    NonNegativeReal(&'static str),
    #[error("expected a finite real number for `{0}`")]
    Finite(&'static str),
}

/// Failures answering a query against an assembled network.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("state {state} is out of range for `{var}` (1..={k})")]
    StateOutOfRange { var: String, state: usize, k: usize },
    #[error(
        "rejection sampling gave up after {draws} draws with {matches} of {wanted} \
         matching samples"
    )]
    Timeout {
        draws: usize,
        matches: usize,
        wanted: usize,
    },
}

pub(crate) enum ErrMsg {
    UnsampledParent,
    StateIndex,
}

impl ErrMsg {
    pub fn panic_msg_with_arg<T: Debug>(&self, arg: T) -> String {
        match *self {
            ErrMsg::UnsampledParent => format!(
                "quaybn: parent `{:?}` was not sampled before its child; \
                 the network order is broken",
                arg
            ),
            ErrMsg::StateIndex => format!(
                "quaybn: parent states `{:?}` do not index a row of the table",
                arg
            ),
        }
    }
}
