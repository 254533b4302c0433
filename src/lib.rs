//! # nor-synth: exact synthesis of NOR-only circuits
//!
//! **`nor-synth`** finds a boolean circuit built exclusively from 2-input NOR
//! gates that reproduces a given truth table over `n` inputs, using the
//! minimum circuit depth and, within that depth, the minimum number of gates.
//!
//! ## How it works
//!
//! A circuit of depth `d` is encoded as a flat array of `2^(d+1) - 1` groups
//! `(id, kind, left, right)`: the slots of a complete binary tree skeleton.
//! A backtracking search assigns the groups in id order, checks every partial
//! assignment against the legality rules of the encoding, and simulates each
//! complete one against the target. Branch-and-bound on the gate count keeps
//! only strict improvements. The driver tries depths `0, 1, 2, ...` and stops
//! at the first depth with a match.
//!
//! ## Basic Usage
//!
//! ```rust
//! use nor_synth::synth::{synthesize, SynthesisConfig};
//! use nor_synth::truth_table::TruthTable;
//!
//! // Rows 00, 01, 10, 11 (x1 is the most significant bit)
//! let target = TruthTable::parse(2, "1000").unwrap();
//!
//! let solution = synthesize(&target, &SynthesisConfig::default()).unwrap();
//! assert_eq!(solution.depth, 1);
//! assert_eq!(solution.gate_count, 1);
//! assert_eq!(solution.circuit().unwrap().to_string(), "NOR(x1, x2)");
//! ```
//!
//! ## Core Components
//!
//! - **[`truth_table`]**: truth tables and the canonical input columns.
//! - **[`encoding`]**: the flat circuit encoding and its legality checks.
//! - **[`circuit`]**: decoding into an arena tree and simulation.
//! - **[`search`]**: the backtracking, branch-and-bound search at one depth.
//! - **[`synth`]**: the depth driver and the problem/solution text formats.
//! - **[`dot`]**: Graphviz output for decoded circuits.
//!
//! Circuits are strict trees: a gate's two children are distinct groups and no
//! group feeds two gates. Inverting an input takes one gate over two leaves
//! reading that input, `NOR(x, x)`.

pub mod bitset;
pub mod circuit;
pub mod dot;
pub mod encoding;
pub mod error;
pub mod search;
pub mod synth;
pub mod truth_table;
pub mod types;
