//! Flat, index-addressed encoding of a bounded-depth NOR circuit.
//!
//! # Layout
//!
//! An encoding of depth `d` over `n` inputs is an array of
//! [`max_nodes(d)`][crate::types::max_nodes] groups `(id, kind, left, right)`.
//! Ids are positional: the group at position `p` has id `p + 1`, and id 1 is the
//! root. A gate names its two children by id; leaves and padding carry `0, 0`.
//!
//! ```text
//!   id kind left right
//!    1   -1    2     3      root = NOR(#2, #3)
//!    2    1    0     0      x1
//!    3    2    0     0      x2
//! ```
//!
//! # Legality
//!
//! A legal encoding is a tree rooted at id 1:
//!
//! - ids are distinct, in `1..=max_nodes`, and positional;
//! - a gate's children satisfy `id < left < right`, exist in the array, and are
//!   referenced by no other gate (no fan-out);
//! - gates sit strictly above the bottom row, both positionally and by tree
//!   level, and number at most [`max_nors(d)`][crate::types::max_nors];
//! - reachable groups are gates or leaves reading an input in `1..=n`;
//!   unreachable groups are padding (`kind = 0`).
//!
//! Because a child always has a larger id than its parent, whether a group is
//! reachable is known as soon as every smaller id is decided. This is what
//! makes [`Encoding::check_prefix`] exact for the search, which decides groups
//! in ascending id order.

use std::fmt;

use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::truth_table::validate_num_inputs;
use crate::types::{level_of, max_nodes, max_nors, Kind};

/// Decided content of one group.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Cell {
    pub kind: Kind,
    pub left: u32,
    pub right: u32,
}

impl Cell {
    pub fn leaf(input: u32) -> Self {
        Cell {
            kind: Kind::Leaf(input),
            left: 0,
            right: 0,
        }
    }

    pub fn unused() -> Self {
        Cell::leaf(0)
    }

    pub fn nor(left: u32, right: u32) -> Self {
        Cell {
            kind: Kind::Nor,
            left,
            right,
        }
    }
}

/// One position of an encoding: a fixed id and its (possibly undetermined) cell.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Group {
    pub id: u32,
    pub cell: Option<Cell>,
}

/// The first invariant an encoding breaks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("expected {expected} groups, found {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("group {0} is undetermined")]
    Undetermined(u32),
    #[error("id {0} is outside the encoding")]
    IdOutOfRange(u32),
    #[error("id {0} appears more than once")]
    DuplicateId(u32),
    #[error("no group has the root id 1")]
    MissingRoot,
    #[error("id {id} is stored at position {position}")]
    MisplacedId { position: usize, id: u32 },
    #[error("root group is unused")]
    UnusedRoot,
    #[error("group {id} reads input {input}, but there are only {num_inputs} inputs")]
    KindOutOfRange { id: u32, input: u32, num_inputs: u32 },
    #[error("leaf {0} has children")]
    LeafWithChildren(u32),
    #[error("group {0} is not referenced by any gate")]
    Unreachable(u32),
    #[error("gate {parent} references missing group {child}")]
    DanglingChild { parent: u32, child: u32 },
    #[error("gate {id} has children {left} and {right} out of order")]
    UnorderedChildren { id: u32, left: u32, right: u32 },
    #[error("gate {id} has child {child} that does not come after it")]
    ChildNotAfterParent { id: u32, child: u32 },
    #[error("group {0} is referenced by more than one gate")]
    SharedChild(u32),
    #[error("more than {max} gates")]
    TooManyGates { max: usize },
    #[error("gate {0} is on the bottom row")]
    GateOnBottomRow(u32),
    #[error("gate {0} is too deep")]
    DepthExceeded(u32),
    #[error("reference cycle through group {0}")]
    Cycle(u32),
}

/// An assignment, partial or complete, of every group of a bounded-depth circuit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Encoding {
    num_inputs: u32,
    depth: u32,
    groups: Vec<Group>,
}

impl Encoding {
    /// A fresh encoding of the given depth with ids `1..=max_nodes` and every cell undetermined.
    pub fn blank(num_inputs: u32, depth: u32) -> Self {
        let groups = (1..=max_nodes(depth) as u32).map(|id| Group { id, cell: None }).collect();
        Encoding {
            num_inputs,
            depth,
            groups,
        }
    }

    /// Builds an encoding from raw `(id, kind, left, right)` rows.
    ///
    /// Only the representation is checked here (the input count must be supported
    /// and kinds must be `-1` or non-negative); use
    /// [`check_complete`][Self::check_complete] for legality.
    pub fn from_rows(num_inputs: u32, depth: u32, rows: &[(u32, i64, u32, u32)]) -> Result<Self> {
        validate_num_inputs(num_inputs)?;
        let groups = rows
            .iter()
            .map(|&(id, raw, left, right)| {
                let kind = Kind::from_raw(raw)
                    .ok_or_else(|| Error::InvalidInput(format!("invalid kind {} for group {}", raw, id)))?;
                Ok(Group {
                    id,
                    cell: Some(Cell { kind, left, right }),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Encoding {
            num_inputs,
            depth,
            groups,
        })
    }

    pub fn num_inputs(&self) -> u32 {
        self.num_inputs
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Cell at the given position, or `None` if it is undetermined or past the end.
    pub fn cell(&self, position: usize) -> Option<Cell> {
        self.groups.get(position).and_then(|g| g.cell)
    }

    /// Position of the group with the given id, if any.
    pub fn position_of(&self, id: u32) -> Option<usize> {
        let guess = id.checked_sub(1)? as usize;
        if self.groups.get(guess).is_some_and(|g| g.id == id) {
            return Some(guess);
        }
        self.groups.iter().position(|g| g.id == id)
    }

    /// Decides the cell at the given position.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`.
    pub fn assign(&mut self, position: usize, cell: Cell) {
        self.groups[position].cell = Some(cell);
    }

    /// Makes the cell at the given position undetermined again.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`.
    pub fn retract(&mut self, position: usize) {
        self.groups[position].cell = None;
    }

    /// Whether every cell is decided.
    pub fn is_assigned(&self) -> bool {
        self.groups.iter().all(|g| g.cell.is_some())
    }

    /// Number of decided gate groups.
    pub fn gate_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.cell.is_some_and(|c| c.kind.is_nor()))
            .count()
    }

    /// Raw `(id, kind, left, right)` rows of a fully assigned encoding.
    ///
    /// Undetermined cells are skipped.
    pub fn rows(&self) -> impl Iterator<Item = (u32, i64, u32, u32)> + '_ {
        self.groups
            .iter()
            .filter_map(|g| g.cell.map(|c| (g.id, c.kind.to_raw(), c.left, c.right)))
    }

    /// Checks the groups at positions `0..up_to`, all of which must be decided.
    ///
    /// References pointing past `up_to` are accepted as pending.
    pub fn check_prefix(&self, up_to: usize) -> std::result::Result<(), Violation> {
        self.walk(up_to.min(self.groups.len()))
    }

    /// Full legality check of a fully assigned encoding.
    pub fn check_complete(&self) -> std::result::Result<(), Violation> {
        let expected = max_nodes(self.depth);
        if self.groups.len() != expected {
            return Err(Violation::WrongLength {
                expected,
                actual: self.groups.len(),
            });
        }
        if !self.groups.iter().any(|g| g.id == 1) {
            return Err(Violation::MissingRoot);
        }
        self.walk(expected)
    }

    pub fn is_legal_prefix(&self, up_to: usize) -> bool {
        self.check_prefix(up_to).is_ok()
    }

    pub fn is_legal_complete(&self) -> bool {
        self.check_complete().is_ok()
    }

    fn walk(&self, up_to: usize) -> std::result::Result<(), Violation> {
        let size = max_nodes(self.depth);
        let prefix = &self.groups[..up_to];

        let mut seen = BitSet::new(size + 1);
        for (position, group) in prefix.iter().enumerate() {
            let id = group.id;
            if group.cell.is_none() {
                return Err(Violation::Undetermined(id));
            }
            if id == 0 || id as usize > size {
                return Err(Violation::IdOutOfRange(id));
            }
            if !seen.insert(id as usize) {
                return Err(Violation::DuplicateId(id));
            }
            if id as usize != position + 1 {
                return Err(Violation::MisplacedId { position, id });
            }
        }

        let mut parent = vec![0u32; size + 1];
        let mut level = vec![0u32; size + 1];
        let mut gates = 0;

        for group in prefix {
            let id = group.id;
            let Some(cell) = group.cell else {
                return Err(Violation::Undetermined(id));
            };
            let reachable = id == 1 || parent[id as usize] != 0;

            match cell.kind {
                Kind::Leaf(input) => {
                    if cell.left != 0 || cell.right != 0 {
                        return Err(Violation::LeafWithChildren(id));
                    }
                    if input > self.num_inputs {
                        return Err(Violation::KindOutOfRange {
                            id,
                            input,
                            num_inputs: self.num_inputs,
                        });
                    }
                    match (input, reachable) {
                        (0, true) if id == 1 => return Err(Violation::UnusedRoot),
                        (0, true) => {
                            return Err(Violation::DanglingChild {
                                parent: parent[id as usize],
                                child: id,
                            })
                        }
                        (_, false) if input != 0 => return Err(Violation::Unreachable(id)),
                        _ => {}
                    }
                }
                Kind::Nor => {
                    gates += 1;
                    if gates > max_nors(self.depth) {
                        return Err(Violation::TooManyGates {
                            max: max_nors(self.depth),
                        });
                    }
                    if !reachable {
                        return Err(Violation::Unreachable(id));
                    }
                    if level_of(id) >= self.depth {
                        return Err(Violation::GateOnBottomRow(id));
                    }
                    if level[id as usize] >= self.depth {
                        return Err(Violation::DepthExceeded(id));
                    }
                    let (left, right) = (cell.left, cell.right);
                    if left >= right {
                        return Err(Violation::UnorderedChildren { id, left, right });
                    }
                    if left <= id {
                        return Err(Violation::ChildNotAfterParent { id, child: left });
                    }
                    if right as usize > size {
                        return Err(Violation::DanglingChild { parent: id, child: right });
                    }
                    for child in [left, right] {
                        if parent[child as usize] != 0 {
                            return Err(Violation::SharedChild(child));
                        }
                    }
                    for child in [left, right] {
                        parent[child as usize] = id;
                        level[child as usize] = level[id as usize] + 1;
                    }
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            match group.cell {
                Some(cell) => writeln!(f, "{} {} {} {}", group.id, cell.kind.to_raw(), cell.left, cell.right)?,
                None => writeln!(f, "{} ? ? ?", group.id)?,
            }
        }
        Ok(())
    }
}
