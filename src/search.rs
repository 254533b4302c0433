//! Backtracking search for a minimum-gate encoding at a fixed depth.
//!
//! # Algorithm
//!
//! Groups are decided in ascending id order. For each group the search tries
//! leaf kinds `0..=n` first and the gate last. A gate takes the two lowest
//! unused ids after its own as children, so children are numbered in
//! breadth-first order and each tree is visited once. Every decision is
//! applied in place, checked with [`Encoding::is_legal_prefix`], explored, and
//! undone, so sibling branches never see each other's state.
//!
//! When the last group is decided, the encoding is decoded and simulated; a
//! match against the target becomes the new best candidate. From then on any
//! branch that would place as many gates as the best candidate is cut
//! (branch-and-bound), so the surviving candidate is the first one, in search
//! order, among those with the fewest gates.
//!
//! # Parallel fan-out
//!
//! With [`SearchConfig::parallel`], the decisions for the first
//! [`split_at`][SearchConfig::split_at] groups are enumerated sequentially and
//! each resulting prefix is searched on the rayon pool. Branches share a
//! [`SharedBound`] that only ever decreases. A branch cuts on its own best
//! when equal or worse but on the shared bound only when strictly worse, and
//! the winner is the lowest gate count with ties going to the earliest branch,
//! so the result is the same encoding the sequential search returns.

use std::ops::AddAssign;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, trace};
use rayon::prelude::*;

use crate::bitset::BitSet;
use crate::circuit::Circuit;
use crate::encoding::{Cell, Encoding};
use crate::error::{Error, Result};
use crate::truth_table::{columns, validate_table, TruthTable};
use crate::types::{max_nodes, max_nors, Kind};

/// Largest supported encoding depth.
pub const MAX_DEPTH: u32 = 8;

/// Cooperative cancellation flag, checked before every decision.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Best gate count seen by any branch. Only strict improvements are accepted.
#[derive(Debug)]
pub struct SharedBound(AtomicUsize);

impl SharedBound {
    pub fn new() -> Self {
        SharedBound(AtomicUsize::new(usize::MAX))
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    /// Lowers the bound to `gates`. Returns true if that was an improvement.
    pub fn offer(&self, gates: usize) -> bool {
        self.0.fetch_min(gates, Ordering::AcqRel) > gates
    }
}

impl Default for SharedBound {
    fn default() -> Self {
        Self::new()
    }
}

/// Search options.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Search independent prefixes on the rayon pool (default: false)
    pub parallel: bool,
    /// Number of leading groups decided before fanning out (default: 3)
    pub split_at: usize,
    /// Optional cancellation token (default: none)
    pub cancel: Option<CancelToken>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            split_at: 3,
            cancel: None,
        }
    }
}

/// Counters collected during one search.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SearchStats {
    /// Decisions applied.
    pub decisions: u64,
    /// Decisions rejected by the prefix check.
    pub illegal: u64,
    /// Gate decisions cut by the gate-count bound.
    pub bounded: u64,
    /// Fully assigned encodings simulated.
    pub complete: u64,
    /// Strict improvements recorded.
    pub candidates: u64,
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, rhs: Self) {
        self.decisions += rhs.decisions;
        self.illegal += rhs.illegal;
        self.bounded += rhs.bounded;
        self.complete += rhs.complete;
        self.candidates += rhs.candidates;
    }
}

/// A complete, legal encoding whose circuit matches the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub encoding: Encoding,
    pub gate_count: usize,
}

/// Outcome of searching one depth.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub depth: u32,
    pub best: Option<Candidate>,
    pub stats: SearchStats,
}

/// Finds the minimum-gate encoding of `target` at the given depth.
///
/// Returns [`Error::NoSolutionAtDepth`] when the depth is exhausted without a match.
pub fn search(target: &TruthTable, depth: u32, config: &SearchConfig) -> Result<Candidate> {
    let report = search_report(target, depth, config)?;
    report.best.ok_or(Error::NoSolutionAtDepth(depth))
}

/// Like [`search`], but also returns the statistics and reports exhaustion as `best: None`.
pub fn search_report(target: &TruthTable, depth: u32, config: &SearchConfig) -> Result<SearchReport> {
    validate_table(target)?;
    if depth > MAX_DEPTH {
        return Err(Error::InvalidInput(format!(
            "depth {} exceeds the supported maximum {}",
            depth, MAX_DEPTH
        )));
    }

    let columns = columns(target.num_inputs());
    let size = max_nodes(depth);
    let cancel = config.cancel.as_ref();

    if !config.parallel || config.split_at == 0 || config.split_at >= size {
        let mut search = Search::new(target, &columns, depth, cancel);
        search.descend(0)?;
        return Ok(SearchReport {
            depth,
            best: search.best,
            stats: search.stats,
        });
    }

    let mut root = Search::new(target, &columns, depth, cancel);
    root.split = Some(Split {
        at: config.split_at,
        frames: Vec::new(),
    });
    root.descend(0)?;
    let frames = root.split.take().map(|s| s.frames).unwrap_or_default();
    let mut stats = root.stats;
    debug!("depth {}: fanning out {} branches at position {}", depth, frames.len(), config.split_at);

    let shared = SharedBound::new();
    let results = frames
        .into_par_iter()
        .map(|frame| {
            let mut search = Search::resume(target, &columns, depth, frame, &shared, cancel);
            search.descend(config.split_at)?;
            Ok((search.best, search.stats))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut best: Option<Candidate> = None;
    for (candidate, branch_stats) in results {
        stats += branch_stats;
        if let Some(candidate) = candidate {
            if best.as_ref().map_or(true, |b| candidate.gate_count < b.gate_count) {
                best = Some(candidate);
            }
        }
    }

    Ok(SearchReport { depth, best, stats })
}

/// Mutable search state at some position, detachable for fan-out.
#[derive(Debug, Clone)]
struct Frame {
    encoding: Encoding,
    /// Ids already taken as some gate's child.
    consumed: BitSet,
    gates: usize,
}

#[derive(Debug)]
struct Split {
    at: usize,
    frames: Vec<Frame>,
}

struct Search<'a> {
    target: &'a TruthTable,
    columns: &'a [TruthTable],
    max_nors: usize,
    frame: Frame,
    best: Option<Candidate>,
    shared: Option<&'a SharedBound>,
    cancel: Option<&'a CancelToken>,
    split: Option<Split>,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    fn new(
        target: &'a TruthTable,
        columns: &'a [TruthTable],
        depth: u32,
        cancel: Option<&'a CancelToken>,
    ) -> Self {
        let encoding = Encoding::blank(target.num_inputs(), depth);
        let consumed = BitSet::new(encoding.len() + 1);
        Search {
            target,
            columns,
            max_nors: max_nors(depth),
            frame: Frame {
                encoding,
                consumed,
                gates: 0,
            },
            best: None,
            shared: None,
            cancel,
            split: None,
            stats: SearchStats::default(),
        }
    }

    fn resume(
        target: &'a TruthTable,
        columns: &'a [TruthTable],
        depth: u32,
        frame: Frame,
        shared: &'a SharedBound,
        cancel: Option<&'a CancelToken>,
    ) -> Self {
        Search {
            target,
            columns,
            max_nors: max_nors(depth),
            frame,
            best: None,
            shared: Some(shared),
            cancel,
            split: None,
            stats: SearchStats::default(),
        }
    }

    fn descend(&mut self, pos: usize) -> Result<()> {
        if self.cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(Error::Cancelled);
        }
        if let Some(split) = self.split.as_mut() {
            if pos == split.at {
                split.frames.push(self.frame.clone());
                return Ok(());
            }
        }
        if pos == self.frame.encoding.len() {
            return self.complete();
        }

        let id = pos as u32 + 1;
        for kind in Kind::search_order(self.target.num_inputs()) {
            match kind {
                Kind::Leaf(input) => self.try_cell(pos, Cell::leaf(input))?,
                Kind::Nor => {
                    if self.frame.gates >= self.max_nors {
                        continue;
                    }
                    if !self.within_bound(self.frame.gates + 1) {
                        self.stats.bounded += 1;
                        continue;
                    }
                    if let Some((left, right)) = self.child_pair(id) {
                        self.try_cell(pos, Cell::nor(left, right))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn try_cell(&mut self, pos: usize, cell: Cell) -> Result<()> {
        self.stats.decisions += 1;
        self.apply(pos, cell);
        if self.frame.encoding.is_legal_prefix(pos + 1) {
            self.descend(pos + 1)?;
        } else {
            self.stats.illegal += 1;
        }
        self.undo(pos, cell);
        Ok(())
    }

    fn apply(&mut self, pos: usize, cell: Cell) {
        self.frame.encoding.assign(pos, cell);
        if cell.kind.is_nor() {
            self.frame.gates += 1;
            self.frame.consumed.insert(cell.left as usize);
            self.frame.consumed.insert(cell.right as usize);
        }
    }

    fn undo(&mut self, pos: usize, cell: Cell) {
        if cell.kind.is_nor() {
            self.frame.gates -= 1;
            self.frame.consumed.remove(cell.left as usize);
            self.frame.consumed.remove(cell.right as usize);
        }
        self.frame.encoding.retract(pos);
    }

    /// Whether a partial assignment with `gates` gates can still improve on the best.
    fn within_bound(&self, gates: usize) -> bool {
        let local = self.best.as_ref().map_or(true, |b| gates < b.gate_count);
        let shared = self.shared.map_or(true, |s| gates <= s.get());
        local && shared
    }

    /// Children for the gate `id`: the two lowest ids after it not yet taken.
    ///
    /// Every tree has exactly one breadth-first labelling, and any other pair
    /// only relabels a circuit reached through this one.
    fn child_pair(&self, id: u32) -> Option<(u32, u32)> {
        let size = self.frame.encoding.len() as u32;
        let mut free = (id + 1..=size).filter(|&c| !self.frame.consumed.contains(c as usize));
        Some((free.next()?, free.next()?))
    }

    fn complete(&mut self) -> Result<()> {
        self.stats.complete += 1;
        let encoding = &self.frame.encoding;
        encoding.check_complete()?;

        let circuit = Circuit::decode(encoding)?;
        if circuit.evaluate_with(circuit.root(), self.columns) != *self.target {
            return Ok(());
        }

        let gate_count = self.frame.gates;
        if self.best.as_ref().is_some_and(|b| gate_count >= b.gate_count) {
            trace!("ignoring match with {} gates", gate_count);
            return Ok(());
        }
        debug!("new best with {} gates: {}", gate_count, circuit);
        self.stats.candidates += 1;
        if let Some(shared) = self.shared {
            shared.offer(gate_count);
        }
        self.best = Some(Candidate {
            encoding: encoding.clone(),
            gate_count,
        });
        Ok(())
    }
}
