//! Depth driver: tries increasing depths until the search finds a circuit.
//!
//! The outer minimisation is over depth: the first depth with any matching
//! circuit wins, whatever its gate count. Within that depth the search
//! minimises gates.

use std::fmt;
use std::str::FromStr;

use log::info;

use crate::circuit::Circuit;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::search::{search_report, SearchConfig, SearchStats, MAX_DEPTH};
use crate::truth_table::{validate_num_inputs, validate_table, TruthTable};
use crate::types::{max_nodes, max_nors};

/// Driver options.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Depths `0..max_depth` are tried (default: 4)
    pub max_depth: u32,
    /// Options passed to every per-depth search
    pub search: SearchConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            search: SearchConfig::default(),
        }
    }
}

/// A synthesis problem: the target table and an optional depth bound.
///
/// # Text Format
///
/// Whitespace-separated: the number of inputs `n`, then the `2^n` table bits
/// (either one token per bit or runs of `0`/`1` characters), then an optional
/// `max_depth`.
///
/// ```text
/// 2
/// 0 1 1 0
/// 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub target: TruthTable,
    pub max_depth: Option<u32>,
}

impl FromStr for Problem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let n: u32 = tokens
            .next()
            .ok_or_else(|| Error::InvalidInput("missing number of inputs".into()))?
            .parse()
            .map_err(|_| Error::InvalidInput("number of inputs is not a non-negative integer".into()))?;
        validate_num_inputs(n)?;

        let rows = 1usize << n;
        let mut bits = String::with_capacity(rows);
        while bits.len() < rows {
            let token = tokens
                .next()
                .ok_or_else(|| Error::InvalidInput(format!("expected {} table bits, got {}", rows, bits.len())))?;
            bits.push_str(token);
        }
        let target = TruthTable::parse(n, &bits)?;

        let max_depth = match tokens.next() {
            None => None,
            Some(token) => Some(
                token
                    .parse()
                    .map_err(|_| Error::InvalidInput(format!("invalid max depth {:?}", token)))?,
            ),
        };
        if let Some(extra) = tokens.next() {
            return Err(Error::InvalidInput(format!("unexpected trailing token {:?}", extra)));
        }

        Ok(Problem { target, max_depth })
    }
}

/// The winning circuit of a synthesis run.
#[derive(Debug, Clone)]
pub struct Solution {
    pub num_inputs: u32,
    pub depth: u32,
    pub gate_count: usize,
    pub encoding: Encoding,
    /// Counters summed over every depth attempted.
    pub stats: SearchStats,
}

impl Solution {
    pub fn circuit(&self) -> Result<Circuit> {
        Circuit::decode(&self.encoding)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.num_inputs, self.depth, self.gate_count)?;
        write!(f, "{}", self.encoding)
    }
}

/// Finds a minimum-depth, then minimum-gate, NOR circuit for `target`.
///
/// Returns [`Error::SynthesisFailed`] when no depth below `config.max_depth` admits one.
pub fn synthesize(target: &TruthTable, config: &SynthesisConfig) -> Result<Solution> {
    validate_table(target)?;
    if config.max_depth > MAX_DEPTH + 1 {
        return Err(Error::InvalidInput(format!(
            "max depth {} exceeds the supported maximum {}",
            config.max_depth,
            MAX_DEPTH + 1
        )));
    }

    let mut stats = SearchStats::default();
    for depth in 0..config.max_depth {
        if config.search.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(Error::Cancelled);
        }
        info!(
            "depth {}: searching {} groups with room for {} gates",
            depth,
            max_nodes(depth),
            max_nors(depth)
        );
        let report = search_report(target, depth, &config.search)?;
        stats += report.stats;
        info!(
            "depth {}: {} decisions, {} illegal, {} bounded, {} simulated",
            depth, report.stats.decisions, report.stats.illegal, report.stats.bounded, report.stats.complete
        );

        match report.best {
            Some(best) => {
                info!("depth {}: found circuit with {} gates", depth, best.gate_count);
                return Ok(Solution {
                    num_inputs: target.num_inputs(),
                    depth,
                    gate_count: best.gate_count,
                    encoding: best.encoding,
                    stats,
                });
            }
            None => info!("depth {}: no circuit", depth),
        }
    }

    Err(Error::SynthesisFailed {
        max_depth: config.max_depth,
    })
}

/// Solves a parsed problem, letting its own depth bound override the config.
pub fn solve(problem: &Problem, config: &SynthesisConfig) -> Result<Solution> {
    let config = SynthesisConfig {
        max_depth: problem.max_depth.unwrap_or(config.max_depth),
        ..config.clone()
    };
    synthesize(&problem.target, &config)
}
