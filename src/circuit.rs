//! Decoding an encoding into an owned NOR tree, and simulating it.
//!
//! The tree lives in an arena addressed by [`Idx`]. Nodes are stored in
//! breadth-first order from the root, so every child has a larger index than
//! its parent and the root is always at index 0.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::encoding::{Encoding, Violation};
use crate::error::Result;
use crate::truth_table::{column, TruthTable};
use crate::types::Kind;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Idx(usize);

impl Idx {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for Idx {
    fn from(index: usize) -> Self {
        Idx(index)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Node {
    /// Input variable `k`, 1-indexed.
    Input(u32),
    Nor(Idx, Idx),
}

#[derive(Debug, Clone)]
pub struct Circuit {
    num_inputs: u32,
    nodes: Vec<Node>,
    /// Encoding id each node was decoded from.
    ids: Vec<u32>,
}

impl Circuit {
    /// Decodes the tree reachable from root id 1.
    ///
    /// Fails with an [`EncodingViolation`][crate::error::Error::EncodingViolation]
    /// on a dangling, shared, or cyclic reference. Legal encodings never hit these.
    pub fn decode(encoding: &Encoding) -> Result<Circuit> {
        let num_inputs = encoding.num_inputs();
        let mut nodes: Vec<Node> = Vec::new();
        let mut ids: Vec<u32> = Vec::new();
        let mut parents: Vec<Option<usize>> = Vec::new();

        let mut visited: HashSet<u32> = HashSet::from([1]);
        let mut frontier: VecDeque<(u32, Option<usize>)> = VecDeque::from([(1, None)]);

        while let Some((id, parent)) = frontier.pop_front() {
            let parent_id = parent.map_or(0, |p| ids[p]);
            let cell = encoding
                .position_of(id)
                .and_then(|pos| encoding.cell(pos))
                .filter(|cell| !cell.kind.is_unused());
            let Some(cell) = cell else {
                return Err(match (id, encoding.position_of(id)) {
                    (1, None) => Violation::MissingRoot,
                    (1, Some(_)) => Violation::UnusedRoot,
                    _ => Violation::DanglingChild {
                        parent: parent_id,
                        child: id,
                    },
                }
                .into());
            };

            let node = match cell.kind {
                Kind::Leaf(input) => {
                    if input > num_inputs {
                        return Err(Violation::KindOutOfRange { id, input, num_inputs }.into());
                    }
                    Node::Input(input)
                }
                Kind::Nor => {
                    let current = nodes.len();
                    let mut children = [Idx(0); 2];
                    for (slot, child) in children.iter_mut().zip([cell.left, cell.right]) {
                        if !visited.insert(child) {
                            let is_ancestor = child == id
                                || std::iter::successors(parent, |&p| parents[p]).any(|p| ids[p] == child);
                            return Err(if is_ancestor {
                                Violation::Cycle(child)
                            } else {
                                Violation::SharedChild(child)
                            }
                            .into());
                        }
                        frontier.push_back((child, Some(current)));
                        *slot = Idx(nodes.len() + frontier.len());
                    }
                    Node::Nor(children[0], children[1])
                }
            };

            nodes.push(node);
            ids.push(id);
            parents.push(parent);
        }

        Ok(Circuit { num_inputs, nodes, ids })
    }

    pub fn num_inputs(&self) -> u32 {
        self.num_inputs
    }

    pub fn root(&self) -> Idx {
        Idx(0)
    }

    pub fn node(&self, idx: Idx) -> Node {
        self.nodes[idx.0]
    }

    /// Encoding id the node came from.
    pub fn source_id(&self, idx: Idx) -> u32 {
        self.ids[idx.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn gate_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Nor(..))).count()
    }

    /// Number of gate levels on the longest root-to-leaf path.
    pub fn depth(&self) -> u32 {
        // Children come after their parents, so a reverse sweep sees them first.
        let mut depth = vec![0u32; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate().rev() {
            if let Node::Nor(l, r) = *node {
                depth[i] = 1 + depth[l.0].max(depth[r.0]);
            }
        }
        depth.first().copied().unwrap_or(0)
    }

    /// Output column of the subtree rooted at `idx`, 2ⁿ rows.
    pub fn evaluate(&self, idx: Idx) -> TruthTable {
        let columns: Vec<TruthTable> = (1..=self.num_inputs).map(|k| column(k, self.num_inputs)).collect();
        self.evaluate_with(idx, &columns)
    }

    /// Output column of the whole circuit.
    pub fn evaluate_root(&self) -> TruthTable {
        self.evaluate(self.root())
    }

    /// Like [`evaluate`][Self::evaluate], reusing precomputed input columns
    /// (`columns[k - 1]` is the column of input `k`).
    pub fn evaluate_with(&self, idx: Idx, columns: &[TruthTable]) -> TruthTable {
        match self.nodes[idx.0] {
            Node::Input(k) => columns[k as usize - 1].clone(),
            Node::Nor(l, r) => self.evaluate_with(l, columns).nor(&self.evaluate_with(r, columns)),
        }
    }

    fn fmt_node(&self, idx: Idx, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nodes[idx.0] {
            Node::Input(k) => write!(f, "x{}", k),
            Node::Nor(l, r) => {
                write!(f, "NOR(")?;
                self.fmt_node(l, f)?;
                write!(f, ", ")?;
                self.fmt_node(r, f)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root(), f)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::error::Error;

    #[test]
    fn test_decode_single_nor() {
        let e = Encoding::from_rows(2, 1, &[(1, -1, 2, 3), (2, 1, 0, 0), (3, 2, 0, 0)]).unwrap();
        let c = Circuit::decode(&e).unwrap();
        assert_eq!(c.len(), 3);
        assert_eq!(c.node(c.root()), Node::Nor(Idx(1), Idx(2)));
        assert_eq!(c.node(Idx(1)), Node::Input(1));
        assert_eq!(c.node(Idx(2)), Node::Input(2));
        assert_eq!(c.gate_count(), 1);
        assert_eq!(c.depth(), 1);
        assert_eq!(c.to_string(), "NOR(x1, x2)");
        assert_eq!(c.evaluate_root().to_string(), "1000");
    }

    #[test]
    fn test_decode_leaf_root() {
        let e = Encoding::from_rows(3, 0, &[(1, 2, 0, 0)]).unwrap();
        let c = Circuit::decode(&e).unwrap();
        assert_eq!(c.depth(), 0);
        assert_eq!(c.gate_count(), 0);
        assert_eq!(c.evaluate_root(), column(2, 3));
    }

    #[test]
    fn test_arena_is_breadth_first() {
        // NOR(NOR(x1, x2), NOR(x2, x1))
        #[rustfmt::skip]
        let e = Encoding::from_rows(2, 2, &[
            (1, -1, 2, 3),
            (2, -1, 4, 5),
            (3, -1, 6, 7),
            (4, 1, 0, 0),
            (5, 2, 0, 0),
            (6, 2, 0, 0),
            (7, 1, 0, 0),
        ])
        .unwrap();
        let c = Circuit::decode(&e).unwrap();
        assert_eq!(c.node(Idx(1)), Node::Nor(Idx(3), Idx(4)));
        assert_eq!(c.node(Idx(2)), Node::Nor(Idx(5), Idx(6)));
        assert_eq!(c.source_id(Idx(5)), 6);
        assert_eq!(c.to_string(), "NOR(NOR(x1, x2), NOR(x2, x1))");
        // NOR of two copies of NOR(x1, x2) is OR(x1, x2)
        assert_eq!(c.evaluate_root().to_string(), "0111");
        assert_eq!(c.depth(), 2);
    }

    #[test]
    fn test_not_via_two_leaves() {
        let e = Encoding::from_rows(1, 1, &[(1, -1, 2, 3), (2, 1, 0, 0), (3, 1, 0, 0)]).unwrap();
        let c = Circuit::decode(&e).unwrap();
        assert_eq!(c.evaluate_root().to_string(), "10");
    }

    #[test]
    fn test_decode_dangling() {
        let e = Encoding::from_rows(2, 1, &[(1, -1, 2, 3), (2, 1, 0, 0), (3, 0, 0, 0)]).unwrap();
        let err = Circuit::decode(&e).unwrap_err();
        assert_eq!(err, Error::EncodingViolation(Violation::DanglingChild { parent: 1, child: 3 }));
    }

    #[test]
    fn test_decode_cycle() {
        let e = Encoding::from_rows(2, 1, &[(1, -1, 2, 3), (2, -1, 1, 3), (3, 1, 0, 0)]).unwrap();
        let err = Circuit::decode(&e).unwrap_err();
        assert_eq!(err, Error::EncodingViolation(Violation::Cycle(1)));
    }

    #[test]
    fn test_decode_self_loop() {
        let e = Encoding::from_rows(2, 0, &[(1, -1, 1, 2)]).unwrap();
        let err = Circuit::decode(&e).unwrap_err();
        assert_eq!(err, Error::EncodingViolation(Violation::Cycle(1)));
    }

    #[test]
    fn test_decode_shared() {
        let e = Encoding::from_rows(2, 1, &[(1, -1, 2, 2), (2, 1, 0, 0), (3, 0, 0, 0)]).unwrap();
        let err = Circuit::decode(&e).unwrap_err();
        assert_eq!(err, Error::EncodingViolation(Violation::SharedChild(2)));
    }

    #[test]
    fn test_decode_unused_root() {
        let e = Encoding::from_rows(2, 0, &[(1, 0, 0, 0)]).unwrap();
        let err = Circuit::decode(&e).unwrap_err();
        assert_eq!(err, Error::EncodingViolation(Violation::UnusedRoot));
    }
}
