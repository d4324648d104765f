//! Infrastructure to declare a discrete Bayesian network: variables, their
//! conditional distributions and the assembled, topologically ordered net.

mod bayesnet;
mod cpt;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::dists::Categorical;
use crate::rng::SimRng;

pub use self::bayesnet::{assemble, BayesNet, MissingNodeWarning, NetIter, Node};
pub use self::cpt::{build_cpt, is_normalized, ordinal_kernel, parent_combinations, CPT};

/// A named discrete random quantity with ordered states `1..=k`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: String,
    k: usize,
}

impl Variable {
    pub fn new<S: Into<String>>(name: S, k: usize) -> Variable {
        Variable {
            name: name.into(),
            k,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

/// A declared parent of a table: its name and how many states it has.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parent {
    name: String,
    k: usize,
}

impl Parent {
    pub fn new<S: Into<String>>(name: S, k: usize) -> Parent {
        Parent {
            name: name.into(),
            k,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

type RowFn = dyn Fn(&[usize]) -> Categorical + Send + Sync;

/// Distribution computed on demand from the parent states.
///
/// Used for nodes whose rows come out of a continuous model (for instance an
/// availability solver) and are cheaper to evaluate than to tabulate.
#[derive(Clone)]
pub struct FunctionalCpd {
    k: usize,
    parents: Vec<Parent>,
    func: Arc<RowFn>,
}

impl FunctionalCpd {
    pub fn new<F>(k: usize, parents: Vec<Parent>, func: F) -> FunctionalCpd
    where
        F: Fn(&[usize]) -> Categorical + Send + Sync + 'static,
    {
        FunctionalCpd {
            k,
            parents,
            func: Arc::new(func),
        }
    }

    /// Evaluates the row for the given parent states.
    ///
    /// The closure must return a distribution over exactly `k` states.
    pub fn eval(&self, parent_states: &[usize]) -> Categorical {
        let row = (self.func)(parent_states);
        debug_assert_eq!(row.k_num(), self.k);
        row
    }
}

impl fmt::Debug for FunctionalCpd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FunctionalCpd")
            .field("k", &self.k)
            .field("parents", &self.parents)
            .finish()
    }
}

/// Conditional distribution of a node given its parents.
#[derive(Debug, Clone)]
pub enum Cpd {
    /// Root node, a fixed prior.
    Static(Categorical),
    /// Explicit rows for each parent-state combination.
    Tabular(CPT),
    /// Rows computed from the parent states when requested.
    Functional(FunctionalCpd),
}

impl Cpd {
    /// Number of states of the variable this distribution belongs to.
    pub fn k(&self) -> usize {
        match self {
            Cpd::Static(cat) => cat.k_num(),
            Cpd::Tabular(cpt) => cpt.k(),
            Cpd::Functional(func) => func.k,
        }
    }

    pub fn parents(&self) -> &[Parent] {
        match self {
            Cpd::Static(_) => &[],
            Cpd::Tabular(cpt) => cpt.parents(),
            Cpd::Functional(func) => &func.parents,
        }
    }

    /// Distribution over this node's states for the given parent states
    /// (one-based, in declared parent order).
    pub fn row_for(&self, parent_states: &[usize]) -> Cow<Categorical> {
        match self {
            Cpd::Static(cat) => Cow::Borrowed(cat),
            Cpd::Tabular(cpt) => Cow::Borrowed(cpt.row_for(parent_states)),
            Cpd::Functional(func) => Cow::Owned(func.eval(parent_states)),
        }
    }

    /// Draws a state given the parent states.
    #[inline]
    pub fn sample_given(&self, parent_states: &[usize], rng: &mut SimRng) -> usize {
        self.row_for(parent_states).sample(rng)
    }
}

impl From<Categorical> for Cpd {
    fn from(cat: Categorical) -> Cpd {
        Cpd::Static(cat)
    }
}

impl From<CPT> for Cpd {
    fn from(cpt: CPT) -> Cpd {
        Cpd::Tabular(cpt)
    }
}

impl From<FunctionalCpd> for Cpd {
    fn from(func: FunctionalCpd) -> Cpd {
        Cpd::Functional(func)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cpd_variants_share_one_interface() {
        let prior = Cpd::from(Categorical::new(vec![0.25, 0.75]).unwrap());
        assert_eq!(prior.k(), 2);
        assert!(prior.parents().is_empty());
        assert_eq!(prior.row_for(&[]).pmf(2), 0.75);

        let var = Variable::new("b", 2);
        let table = Cpd::from(
            build_cpt(&var, &["a"], &[2], |s| {
                if s[0] == 1 {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .unwrap(),
        );
        let func = Cpd::from(FunctionalCpd::new(
            2,
            vec![Parent::new("a", 2)],
            |s: &[usize]| Categorical::point_mass(2, s[0]).unwrap(),
        ));
        let mut rng = SimRng::new(1);
        for a in 1..=2 {
            assert_eq!(table.row_for(&[a]), func.row_for(&[a]));
            assert_eq!(table.sample_given(&[a], &mut rng), a);
            assert_eq!(func.sample_given(&[a], &mut rng), a);
        }
        assert_eq!(func.parents()[0].name(), "a");
    }
}
