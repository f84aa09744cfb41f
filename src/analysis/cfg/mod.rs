//! Control flow graph construction.
//!
//! This module turns a function's linear instruction stream into a graph of
//! basic blocks and cleans that graph up before the dataflow analyses run.
//!
//! # Key Components
//!
//! - [`FlowGraph`] - The graph of one function and the analysis pipeline
//! - [`BasicBlock`] - A straight-line run of instructions with one exit
//! - [`Terminator`] - How control leaves a block, with successor indices
//! - [`CfgEdge`] / [`CfgEdgeKind`] - Edges derived from terminators
//!
//! # Construction
//!
//! Partitioning numbers instructions into blocks in a single linear scan.
//! A block ends at every branch or return, and a new block starts at every
//! label some branch jumps to. Labels nobody jumps to are dropped, so they
//! never split a block.
//!
//! Simplification then removes blocks that cannot be reached from the entry
//! and empty blocks whose only content is a jump, retargeting predecessors
//! past them. Survivors are renumbered densely.
//!
//! # Thread Safety
//!
//! [`FlowGraph`] is [`Send`] and [`Sync`]. It is built and analysed by one
//! thread; independent graphs can be built in parallel.

mod block;
mod edge;
mod graph;
mod partition;
mod simplify;

pub use block::{BasicBlock, EndKind, Instr, Terminator};
pub use edge::{CfgEdge, CfgEdgeKind};
pub use graph::FlowGraph;
