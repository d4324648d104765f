use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use super::Cpd;
use crate::err::ModelError;

/// A declared node that had no distribution supplied; the network is
/// assembled without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingNodeWarning {
    pub name: String,
}

impl fmt::Display for MissingNodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "no distribution supplied for node `{}`, omitted", self.name)
    }
}

/// A discrete Bayesian network whose nodes are stored parents-first.
#[derive(Debug, Clone)]
pub struct BayesNet {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    warnings: Vec<MissingNodeWarning>,
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    cpd: Cpd,
    parents: SmallVec<[usize; 4]>,
    pos: usize, // position in the bayes net vec of self
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cpd(&self) -> &Cpd {
        &self.cpd
    }

    /// Number of states of this node.
    pub fn k(&self) -> usize {
        self.cpd.k()
    }

    /// Positions of the parents, in declared parent order.
    pub fn parents_positions(&self) -> &[usize] {
        &self.parents
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Builds a network from the distributions keyed by node name, following
/// `order`, which must list parents before their children.
///
/// A name in `order` with no distribution is skipped and reported as a
/// [`MissingNodeWarning`]. Referencing a parent that is not yet in the
/// network, or declaring a different number of states for it than it has,
/// aborts assembly.
pub fn assemble<S: AsRef<str>>(
    mut cpds: HashMap<String, Cpd>,
    order: &[S],
) -> Result<BayesNet, ModelError> {
    let mut net = BayesNet {
        nodes: Vec::with_capacity(order.len()),
        index: HashMap::with_capacity(order.len()),
        warnings: vec![],
    };

    for name in order {
        let name = name.as_ref();
        if net.index.contains_key(name) {
            return Err(ModelError::DuplicateNode(name.to_owned()));
        }
        let cpd = match cpds.remove(name) {
            Some(cpd) => cpd,
            None => {
                let warning = MissingNodeWarning {
                    name: name.to_owned(),
                };
                log::warn!("{}", warning);
                net.warnings.push(warning);
                continue;
            }
        };

        let mut parents = SmallVec::with_capacity(cpd.parents().len());
        for parent in cpd.parents() {
            let pos = *net
                .index
                .get(parent.name())
                .ok_or_else(|| ModelError::UnknownParent {
                    node: name.to_owned(),
                    parent: parent.name().to_owned(),
                })?;
            let actual = net.nodes[pos].k();
            if actual != parent.k() {
                return Err(ModelError::ParentCardinality {
                    node: name.to_owned(),
                    parent: parent.name().to_owned(),
                    declared: parent.k(),
                    actual,
                });
            }
            parents.push(pos);
        }

        let pos = net.nodes.len();
        log::trace!("assembled node `{}` at {} with parents {:?}", name, pos, parents);
        net.index.insert(name.to_owned(), pos);
        net.nodes.push(Node {
            name: name.to_owned(),
            cpd,
            parents,
            pos,
        });
    }

    for name in cpds.keys() {
        log::warn!("distribution for `{}` is not in the declared order, ignored", name);
    }
    Ok(net)
}

impl BayesNet {
    /// Iterate the network variables in topological order.
    pub fn iter_vars(&self) -> NetIter {
        NetIter {
            nodes: self.nodes.iter(),
        }
    }

    /// Returns the total number of variables in the network.
    pub fn var_num(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&pos| &self.nodes[pos])
    }

    pub fn node_at(&self, pos: usize) -> &Node {
        &self.nodes[pos]
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declared nodes that were left out because no distribution was given.
    pub fn warnings(&self) -> &[MissingNodeWarning] {
        &self.warnings
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Names of every ancestor of `name`, parents-first.
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let pos = match self.position(name) {
            Some(pos) => pos,
            None => return vec![],
        };
        let mut marked = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.nodes[pos].parents.to_vec();
        while let Some(p) = stack.pop() {
            if !marked[p] {
                marked[p] = true;
                stack.extend(self.nodes[p].parents.iter().copied());
            }
        }
        self.nodes
            .iter()
            .filter(|n| marked[n.pos])
            .map(|n| n.name.as_str())
            .collect()
    }
}

/// Bayesian Network iterator, visits all nodes from parents to childs
pub struct NetIter<'a> {
    nodes: std::slice::Iter<'a, Node>,
}

impl<'a> Iterator for NetIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl<'a> ExactSizeIterator for NetIter<'a> {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dists::Categorical;
    use crate::model::{build_cpt, Variable};

    fn coin(name: &str) -> (String, Cpd) {
        (
            name.to_owned(),
            Cpd::from(Categorical::new(vec![0.5, 0.5]).unwrap()),
        )
    }

    fn child_of(name: &str, parents: &[&str]) -> (String, Cpd) {
        let var = Variable::new(name, 2);
        let cards = vec![2; parents.len()];
        let cpt = build_cpt(&var, parents, &cards, |_| vec![0.5, 0.5]).unwrap();
        (name.to_owned(), Cpd::from(cpt))
    }

    #[test]
    fn assembles_in_declared_order() {
        let cpds: HashMap<_, _> = vec![coin("a"), coin("b"), child_of("c", &["a", "b"])]
            .into_iter()
            .collect();
        let net = assemble(cpds, &["a", "b", "c"]).unwrap();
        assert_eq!(net.var_num(), 3);
        assert_eq!(net.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(net.node("c").unwrap().parents_positions(), &[0, 1]);
        assert!(net.node("a").unwrap().is_root());
        assert!(net.warnings().is_empty());
        assert_eq!(net.iter_vars().len(), 3);
    }

    #[test]
    fn missing_node_is_reported_not_fatal() {
        let cpds: HashMap<_, _> = vec![coin("a"), child_of("c", &["a"])].into_iter().collect();
        let net = assemble(cpds, &["a", "b", "c"]).unwrap();
        assert_eq!(net.var_num(), 2);
        assert_eq!(
            net.warnings(),
            &[MissingNodeWarning {
                name: "b".to_owned()
            }]
        );
        assert!(!net.contains("b"));
    }

    #[test]
    fn child_before_parent_is_fatal() {
        let cpds: HashMap<_, _> = vec![coin("a"), child_of("c", &["a"])].into_iter().collect();
        let err = assemble(cpds, &["c", "a"]).unwrap_err();
        assert!(matches!(err, ModelError::UnknownParent { ref parent, .. } if parent == "a"));
    }

    #[test]
    fn omitted_parent_is_fatal() {
        let cpds: HashMap<_, _> = vec![coin("a"), child_of("c", &["a", "b"])]
            .into_iter()
            .collect();
        let err = assemble(cpds, &["a", "b", "c"]).unwrap_err();
        assert!(matches!(err, ModelError::UnknownParent { ref parent, .. } if parent == "b"));
    }

    #[test]
    fn parent_cardinality_must_agree() {
        let three = (
            "a".to_owned(),
            Cpd::from(Categorical::new(vec![0.2, 0.3, 0.5]).unwrap()),
        );
        let cpds: HashMap<_, _> = vec![three, child_of("c", &["a"])].into_iter().collect();
        let err = assemble(cpds, &["a", "c"]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ParentCardinality {
                declared: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn ancestors_are_parents_first() {
        let cpds: HashMap<_, _> = vec![
            coin("a"),
            coin("b"),
            child_of("c", &["a"]),
            child_of("d", &["c", "b"]),
            child_of("e", &["a"]),
        ]
        .into_iter()
        .collect();
        let net = assemble(cpds, &["a", "b", "c", "d", "e"]).unwrap();
        assert_eq!(net.ancestors("d"), vec!["a", "b", "c"]);
        assert_eq!(net.ancestors("e"), vec!["a"]);
        assert!(net.ancestors("a").is_empty());
    }
}
