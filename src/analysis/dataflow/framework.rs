//! Data flow analysis framework trait.
//!
//! This module defines the core abstraction for data flow analyses over a
//! [`crate::FlowGraph`]. A specific analysis implements the
//! [`DataFlowAnalysis`] trait to work with the [`DataFlowSolver`].
//!
//! Every analysis here runs backward: information flows from the exits of a
//! function towards its entry, and the values of a block's successors are
//! combined with [`MeetSemiLattice::meet`].
//!
//! [`DataFlowSolver`]: crate::analysis::DataFlowSolver

use crate::analysis::{cfg::BasicBlock, dataflow::lattice::MeetSemiLattice};

/// A backward data flow analysis.
///
/// Implementations provide the transfer function and boundary conditions;
/// the solver handles iteration to a fixpoint.
///
/// The transfer function computes the state at block entry from the state at
/// block exit: `in[B] = transfer(B, out[B])`. The state at exit is the meet
/// of the successors' entry states, or [`boundary`](Self::boundary) for
/// blocks without successors.
///
/// # Example
///
/// ```rust
/// use tacflow::analysis::{BasicBlock, DataFlowAnalysis, VarSet};
///
/// /// Temps read by the terminator of some block reachable from here.
/// struct TerminatorReads {
///     temps: usize,
/// }
///
/// impl DataFlowAnalysis for TerminatorReads {
///     type Lattice = VarSet;
///
///     fn boundary(&self) -> VarSet {
///         VarSet::new(self.temps)
///     }
///
///     fn initial(&self) -> VarSet {
///         VarSet::new(self.temps)
///     }
///
///     fn transfer(&self, _block_id: usize, block: &BasicBlock, output: &VarSet) -> VarSet {
///         let mut input = output.clone();
///         input.extend(block.var());
///         input
///     }
/// }
/// ```
pub trait DataFlowAnalysis {
    /// The lattice type for this analysis.
    ///
    /// This must implement `MeetSemiLattice` to support combining values
    /// at control flow merge points.
    type Lattice: MeetSemiLattice;

    /// Returns the value at the exit of blocks that leave the function.
    fn boundary(&self) -> Self::Lattice;

    /// Returns the value every block starts with before iteration begins.
    fn initial(&self) -> Self::Lattice;

    /// Computes the transfer function for a basic block.
    ///
    /// # Arguments
    ///
    /// * `block_id` - The index of the block being processed
    /// * `block` - The block
    /// * `output` - The abstract state at the exit of the block
    ///
    /// # Returns
    ///
    /// The abstract state at the entry of the block.
    fn transfer(&self, block_id: usize, block: &BasicBlock, output: &Self::Lattice)
        -> Self::Lattice;
}

/// Results of a data flow analysis.
///
/// This provides access to the computed abstract values at block boundaries.
#[derive(Debug, Clone)]
pub struct AnalysisResults<L> {
    /// Entry state for each block (after the transfer function).
    pub in_states: Vec<L>,
    /// Exit state for each block (before the transfer function).
    pub out_states: Vec<L>,
    /// Number of block visits the solver made.
    pub iterations: usize,
}

impl<L> AnalysisResults<L> {
    /// Creates new analysis results with the given states.
    #[must_use]
    pub fn new(in_states: Vec<L>, out_states: Vec<L>, iterations: usize) -> Self {
        Self {
            in_states,
            out_states,
            iterations,
        }
    }

    /// Returns the entry state for a block, or `None` if the index is out of
    /// bounds.
    #[must_use]
    pub fn in_state(&self, block: usize) -> Option<&L> {
        self.in_states.get(block)
    }

    /// Returns the exit state for a block, or `None` if the index is out of
    /// bounds.
    #[must_use]
    pub fn out_state(&self, block: usize) -> Option<&L> {
        self.out_states.get(block)
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.in_states.len()
    }
}
