//! Data flow analysis framework.
//!
//! This module provides a generic framework for computing properties that
//! propagate backward along control flow edges of a [`crate::FlowGraph`],
//! using a worklist-based solver.
//!
//! # Architecture
//!
//! The framework is built around three core abstractions:
//!
//! - **Lattice**: Defines the domain of abstract values with a meet operation
//! - **Analysis**: Specifies transfer functions and boundary conditions
//! - **Solver**: Iteratively computes fixpoints using a worklist algorithm
//!
//! # Analyses Provided
//!
//! - [`LiveVariables`]: Determines which temps are live at each block boundary
//!
//! # Thread Safety
//!
//! All types in this module are `Send` and `Sync`.

mod framework;
mod lattice;
mod liveness;
mod solver;

pub use framework::{AnalysisResults, DataFlowAnalysis};
pub use lattice::MeetSemiLattice;
pub use liveness::{default_iteration_limit, satisfies_equations, LiveVariables};
pub use solver::DataFlowSolver;

pub(crate) use liveness::{compute_instruction_liveness, compute_liveness};
