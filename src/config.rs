//! Configuration for flow-graph construction
//!
//! This module selects which analyses [`crate::FlowGraph::build`] runs after
//! partitioning and simplification, and bounds the liveness solver.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Analyses that can run once the graph structure is final
    pub struct Analyses : u8 {
        /// Block-level DEF/USE sets and the live-in/live-out fixed point
        const LIVENESS = 0x01;
        /// Live-out sets for every instruction (requires `LIVENESS`)
        const INSTRUCTION_LIVENESS = 0x02;
        /// Definition-use chains for every defining instruction
        const DU_CHAINS = 0x04;
    }
}

/// Configuration for flow-graph construction
///
/// Partitioning and simplification always run; everything else is selected
/// through [`analyses`](Self::analyses). Requesting instruction-level
/// liveness implies block-level liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    /// Analyses to run after the structure is built
    pub analyses: Analyses,

    /// Maximum number of block visits the liveness solver may make.
    /// `None` derives a bound from the graph size that a correct solve never
    /// reaches (blocks + edges * temps + 1)
    pub max_solver_iterations: Option<usize>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            analyses: Analyses::all(),
            max_solver_iterations: None,
        }
    }
}

impl FlowConfig {
    /// Builds the graph structure only
    ///
    /// Blocks are partitioned and simplified, but liveness sets stay empty and
    /// no DU chains are attached.
    #[must_use]
    pub fn structure_only() -> Self {
        Self {
            analyses: Analyses::empty(),
            max_solver_iterations: None,
        }
    }

    /// Block and instruction liveness, no DU chains
    #[must_use]
    pub fn liveness_only() -> Self {
        Self {
            analyses: Analyses::LIVENESS | Analyses::INSTRUCTION_LIVENESS,
            max_solver_iterations: None,
        }
    }

    /// Returns the analyses to run with implied dependencies added
    #[must_use]
    pub fn effective_analyses(&self) -> Analyses {
        let mut analyses = self.analyses;
        if analyses.contains(Analyses::INSTRUCTION_LIVENESS) {
            analyses |= Analyses::LIVENESS;
        }
        analyses
    }
}
