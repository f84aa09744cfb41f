//! Control-flow and dataflow analysis of three-address code.
//!
//! This module turns one function's instruction stream into a
//! [`FlowGraph`] and annotates it with the facts register allocation and
//! code emission need.
//!
//! # Architecture
//!
//! The analysis module is organized into focused sub-modules:
//!
//! - [`cfg`] - Basic-block partitioning, graph simplification and the
//!   [`FlowGraph`] pipeline
//! - [`dataflow`] - A backward worklist framework and live-variable analysis
//! - [`defuse`] - Definition-use chains
//! - [`VarSet`] - The set type every analysis result is expressed in
//!
//! # Usage
//!
//! ```rust
//! use tacflow::{analysis::FlowGraph, FunctionBuilder};
//!
//! let mut fb = FunctionBuilder::new("id");
//! let (x, y) = (fb.new_temp(), fb.new_temp());
//! fb.assign(y, x).ret(Some(y));
//!
//! let graph = FlowGraph::new(fb.finish())?;
//! let entry = graph.block(0).expect("entry block");
//! assert!(entry.live_in().contains(x));
//! assert!(!entry.live_in().contains(y));
//! # Ok::<(), tacflow::Error>(())
//! ```

mod batch;
pub mod cfg;
pub mod dataflow;
pub mod defuse;
mod dump;
mod varset;

// Re-export primary types at module level
pub use batch::analyze_functions;
pub use cfg::{BasicBlock, CfgEdge, CfgEdgeKind, EndKind, FlowGraph, Instr, Terminator};
pub use dataflow::{
    AnalysisResults, DataFlowAnalysis, DataFlowSolver, LiveVariables, MeetSemiLattice,
};
pub use defuse::{DuPosition, DuUse};
pub use varset::VarSet;
