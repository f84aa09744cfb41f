//! Worklist-based data flow solver.
//!
//! This module provides the iterative solver that computes fixpoints for
//! backward data flow analyses.
//!
//! # Algorithm
//!
//! 1. Initialize every block's entry and exit state with the initial value
//! 2. Add all blocks to the worklist, highest block number first
//! 3. While the worklist is non-empty:
//!    a. Remove a block from the worklist
//!    b. Compute its exit state by meeting the entry states of its
//!       successors (the boundary value for blocks without successors)
//!    c. Apply the transfer function to get the entry state
//!    d. If the entry state changed, add the block's predecessors
//!
//! Visiting blocks from the end of the function towards the start lets a
//! backward analysis over straight-line code converge in a single pass.
//!
//! # Termination
//!
//! For a monotone analysis over a finite lattice the worklist drains on its
//! own. The solver additionally counts block visits and gives up with
//! [`Error::IterationLimit`] once the count exceeds the configured limit, so
//! a broken transfer function cannot hang the caller.

use std::collections::VecDeque;

use crate::{
    analysis::{
        cfg::BasicBlock,
        dataflow::{
            framework::{AnalysisResults, DataFlowAnalysis},
            lattice::MeetSemiLattice,
        },
    },
    Error, Result,
};

/// Worklist-based data flow solver.
///
/// # Usage
///
/// ```rust
/// use tacflow::analysis::{DataFlowSolver, LiveVariables};
/// use tacflow::{FlowConfig, FlowGraph, FunctionBuilder};
///
/// let mut fb = FunctionBuilder::new("f");
/// let (a, b) = (fb.new_temp(), fb.new_temp());
/// fb.load_imm4(a, 1).assign(b, a).ret(Some(b));
/// let graph = FlowGraph::build(fb.finish(), &FlowConfig::structure_only())?;
///
/// let analysis = LiveVariables::new(graph.blocks(), graph.temp_count());
/// let results = DataFlowSolver::new(analysis).solve(graph.blocks())?;
/// assert!(results.in_state(0).is_some_and(|live| live.is_empty()));
/// # Ok::<(), tacflow::Error>(())
/// ```
pub struct DataFlowSolver<A: DataFlowAnalysis> {
    /// The analysis being solved.
    analysis: A,
    /// Entry state for each block.
    in_states: Vec<A::Lattice>,
    /// Exit state for each block.
    out_states: Vec<A::Lattice>,
    /// Predecessors of each block, derived from the terminators.
    predecessors: Vec<Vec<usize>>,
    /// Worklist of blocks to process.
    worklist: VecDeque<usize>,
    /// Whether each block is currently in the worklist (for deduplication).
    in_worklist: Vec<bool>,
    /// Number of block visits performed.
    iterations: usize,
    /// Maximum number of block visits before giving up.
    limit: Option<usize>,
}

impl<A: DataFlowAnalysis> DataFlowSolver<A> {
    /// Creates a new solver for the given analysis.
    #[must_use]
    pub fn new(analysis: A) -> Self {
        Self {
            analysis,
            in_states: Vec::new(),
            out_states: Vec::new(),
            predecessors: Vec::new(),
            worklist: VecDeque::new(),
            in_worklist: Vec::new(),
            iterations: 0,
            limit: None,
        }
    }

    /// Bounds the number of block visits. Without a bound the solver runs
    /// until the worklist drains.
    #[must_use]
    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the number of block visits performed.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Solves the data flow analysis to a fixpoint.
    ///
    /// Successor indices of every block must be valid indices into `blocks`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IterationLimit`] if the configured visit bound is
    /// exceeded before the worklist drains.
    pub fn solve(mut self, blocks: &[BasicBlock]) -> Result<AnalysisResults<A::Lattice>> {
        if blocks.is_empty() {
            return Ok(AnalysisResults::new(Vec::new(), Vec::new(), 0));
        }

        self.initialize(blocks);

        while let Some(block_idx) = self.worklist.pop_front() {
            self.in_worklist[block_idx] = false;
            self.iterations += 1;
            if let Some(limit) = self.limit {
                if self.iterations > limit {
                    return Err(Error::IterationLimit(limit));
                }
            }

            if self.process(block_idx, &blocks[block_idx]) {
                self.add_predecessors_to_worklist(block_idx);
            }
        }

        log::trace!(
            "solver: fixpoint after {} visits over {} blocks",
            self.iterations,
            blocks.len()
        );

        Ok(AnalysisResults::new(
            self.in_states,
            self.out_states,
            self.iterations,
        ))
    }

    fn initialize(&mut self, blocks: &[BasicBlock]) {
        let num_blocks = blocks.len();
        let initial = self.analysis.initial();

        self.in_states = vec![initial.clone(); num_blocks];
        self.out_states = vec![initial; num_blocks];
        self.in_worklist = vec![true; num_blocks];
        self.predecessors = vec![Vec::new(); num_blocks];
        for (idx, block) in blocks.iter().enumerate() {
            for succ in block.successors() {
                if !self.predecessors[succ].contains(&idx) {
                    self.predecessors[succ].push(idx);
                }
            }
        }

        self.worklist = (0..num_blocks).rev().collect();
    }

    /// Recomputes one block. Returns `true` if its entry state changed.
    fn process(&mut self, block_idx: usize, block: &BasicBlock) -> bool {
        let mut output: Option<A::Lattice> = None;
        for succ in block.successors() {
            let succ_in = &self.in_states[succ];
            output = Some(match output {
                None => succ_in.clone(),
                Some(acc) => acc.meet(succ_in),
            });
        }
        let output = output.unwrap_or_else(|| self.analysis.boundary());

        let input = self.analysis.transfer(block_idx, block, &output);
        self.out_states[block_idx] = output;

        let changed = input != self.in_states[block_idx];
        self.in_states[block_idx] = input;
        changed
    }

    fn add_predecessors_to_worklist(&mut self, block_idx: usize) {
        for &pred in &self.predecessors[block_idx] {
            if !self.in_worklist[pred] {
                self.worklist.push_back(pred);
                self.in_worklist[pred] = true;
            }
        }
    }
}
