//! Error types.

use crate::encoding::Violation;

/// Errors produced while validating a problem, decoding an encoding, or searching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The problem itself is malformed: zero inputs, a truth table of the wrong length,
    /// unparsable bits, or limits outside the supported range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An encoding broke a structural invariant. Never caused by user input when it
    /// comes out of the search, so it points at a bug in the engine.
    #[error("encoding violation: {0}")]
    EncodingViolation(#[from] Violation),

    /// The search exhausted the given depth without finding a matching circuit.
    #[error("no circuit found at depth {0}")]
    NoSolutionAtDepth(u32),

    /// Every depth below `max_depth` was exhausted.
    #[error("no circuit found up to max depth {max_depth}")]
    SynthesisFailed { max_depth: u32 },

    /// The search was stopped through its cancellation token.
    #[error("search cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
