//! Node kinds and the size arithmetic of bounded-depth encodings.
//!
//! An encoding of depth `d` is a complete binary tree skeleton of height `d`:
//! it has room for [`max_nodes(d)`][max_nodes] groups, of which at most
//! [`max_nors(d)`][max_nors] can be gates.
use std::fmt;

/// What a group of an encoding holds.
///
/// In the raw integer form, a gate is `-1` and a leaf is its input index `k`
/// in `0..=n`, where `k = 0` is reserved for unused (padding) slots. Inputs are
/// 1-indexed like variables in DIMACS.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Kind {
    /// Leaf reading input `k`, or padding when `k == 0`.
    Leaf(u32),
    /// Two-input NOR gate.
    Nor,
}

impl Kind {
    /// The padding kind of unreachable slots.
    pub const UNUSED: Kind = Kind::Leaf(0);

    /// Raw integer used by the external encoding format.
    pub fn to_raw(self) -> i64 {
        match self {
            Kind::Nor => -1,
            Kind::Leaf(k) => k as i64,
        }
    }

    /// Parses a raw kind, returning `None` for anything other than `-1` or a
    /// non-negative input index that fits in `u32`.
    pub fn from_raw(raw: i64) -> Option<Kind> {
        match raw {
            -1 => Some(Kind::Nor),
            k if k >= 0 => u32::try_from(k).ok().map(Kind::Leaf),
            _ => None,
        }
    }

    pub fn is_nor(self) -> bool {
        matches!(self, Kind::Nor)
    }

    pub fn is_unused(self) -> bool {
        self == Kind::UNUSED
    }

    /// Input index of a leaf reading a real input.
    pub fn input(self) -> Option<u32> {
        match self {
            Kind::Leaf(k) if k > 0 => Some(k),
            _ => None,
        }
    }

    /// All kinds in search order for `n` inputs: leaves `0..=n`, then the gate.
    pub fn search_order(num_inputs: u32) -> impl Iterator<Item = Kind> {
        (0..=num_inputs).map(Kind::Leaf).chain(std::iter::once(Kind::Nor))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Nor => write!(f, "NOR"),
            Kind::Leaf(0) => write!(f, "-"),
            Kind::Leaf(k) => write!(f, "x{}", k),
        }
    }
}

/// Number of groups in an encoding of the given depth: `2^(depth+1) - 1`.
pub fn max_nodes(depth: u32) -> usize {
    (1usize << (depth + 1)) - 1
}

/// Maximum number of gates in an encoding of the given depth: `2^depth - 1`.
pub fn max_nors(depth: u32) -> usize {
    (1usize << depth) - 1
}

/// Level of a positional id in the complete skeleton (root id 1 is level 0).
///
/// Ids at level `depth` are the bottom row and can only hold leaves.
pub fn level_of(id: u32) -> u32 {
    debug_assert!(id > 0);
    u32::BITS - 1 - id.leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        assert_eq!(Kind::Nor.to_raw(), -1);
        assert_eq!(Kind::Leaf(3).to_raw(), 3);
        assert_eq!(Kind::from_raw(-1), Some(Kind::Nor));
        assert_eq!(Kind::from_raw(0), Some(Kind::UNUSED));
        assert_eq!(Kind::from_raw(2), Some(Kind::Leaf(2)));
        assert_eq!(Kind::from_raw(-2), None);
    }

    #[test]
    fn test_search_order() {
        let order: Vec<Kind> = Kind::search_order(2).collect();
        assert_eq!(order, vec![Kind::Leaf(0), Kind::Leaf(1), Kind::Leaf(2), Kind::Nor]);
    }

    #[test]
    fn test_input() {
        assert_eq!(Kind::Leaf(2).input(), Some(2));
        assert_eq!(Kind::UNUSED.input(), None);
        assert_eq!(Kind::Nor.input(), None);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(max_nodes(0), 1);
        assert_eq!(max_nors(0), 0);
        assert_eq!(max_nodes(1), 3);
        assert_eq!(max_nors(1), 1);
        assert_eq!(max_nodes(3), 15);
        assert_eq!(max_nors(3), 7);
    }

    #[test]
    fn test_level_of() {
        assert_eq!(level_of(1), 0);
        assert_eq!(level_of(2), 1);
        assert_eq!(level_of(3), 1);
        assert_eq!(level_of(4), 2);
        assert_eq!(level_of(7), 2);
        assert_eq!(level_of(8), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(Kind::Nor.to_string(), "NOR");
        assert_eq!(Kind::Leaf(1).to_string(), "x1");
        assert_eq!(Kind::UNUSED.to_string(), "-");
    }
}
