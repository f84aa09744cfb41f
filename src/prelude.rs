//! # tacflow Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the tacflow library. Import this module to get quick access to the
//! essential types for building and analysing flow graphs.
//!
//! ```rust
//! use tacflow::prelude::*;
//!
//! let mut fb = FunctionBuilder::new("noop");
//! fb.ret(None);
//! let graph = FlowGraph::build(fb.finish(), &FlowConfig::structure_only())?;
//! assert_eq!(graph.blocks()[0].end_kind(), EndKind::Return);
//! # Ok::<(), tacflow::Error>(())
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all tacflow operations
pub use crate::Error;

/// The result type used throughout tacflow
pub use crate::Result;

/// Configuration for flow-graph construction
pub use crate::{Analyses, FlowConfig};

// ================================================================================================
// Instruction Stream
// ================================================================================================

/// Instruction model and construction
pub use crate::tac::{BinaryOp, Function, FunctionBuilder, Label, Tac, Temp, UnaryOp};

// ================================================================================================
// Analysis
// ================================================================================================

/// Flow graph and its building blocks
pub use crate::analysis::{
    analyze_functions, BasicBlock, EndKind, FlowGraph, Instr, Terminator, VarSet,
};

/// Definition-use chain entries
pub use crate::analysis::{DuPosition, DuUse};
