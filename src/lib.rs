// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # tacflow
//!
//! Control-flow and dataflow analysis for a compiler backend working on
//! three-address code (TAC).
//!
//! `tacflow` takes the linear instruction stream of one function, as
//! produced by instruction generation, and turns it into a graph of basic
//! blocks annotated with the facts register allocation and code emission
//! need:
//!
//! - **Basic blocks** - a single linear scan splits the stream at branches,
//!   returns and branch targets
//! - **Simplification** - unreachable blocks are dropped and jumps are
//!   threaded through empty redirect blocks
//! - **Liveness** - live-in/live-out sets per block from a backward
//!   worklist fixed point, then live-out sets per instruction
//! - **DU chains** - for every definition, the instructions and terminators
//!   that may read the value before it is overwritten
//!
//! ## Quick Start
//!
//! ```rust
//! use tacflow::prelude::*;
//!
//! // t1 = a + b; if (t1 == 0) goto L; t2 = t1 * t1; return t2; L: return t1;
//! let mut fb = FunctionBuilder::new("f");
//! let (a, b, t1, t2) = (fb.new_temp(), fb.new_temp(), fb.new_temp(), fb.new_temp());
//! let l = fb.new_label();
//! fb.binary(BinaryOp::Add, t1, a, b)
//!     .beqz(t1, l)
//!     .binary(BinaryOp::Mul, t2, t1, t1)
//!     .ret(Some(t2))
//!     .mark(l)
//!     .ret(Some(t1));
//!
//! let graph = FlowGraph::new(fb.finish())?;
//! let entry = &graph.blocks()[0];
//! assert_eq!(entry.live_in().iter().collect::<Vec<_>>(), vec![a, b]);
//! assert_eq!(entry.live_out().iter().collect::<Vec<_>>(), vec![t1]);
//!
//! let chain = entry.instrs()[0].du_chain().unwrap_or_default();
//! assert!(chain.contains(&DuUse::end_of_block(0)));
//! # Ok::<(), tacflow::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`tac`] - The instruction stream: [`Temp`], [`Label`], [`Tac`],
//!   [`Function`] and [`FunctionBuilder`]
//! - [`analysis`] - [`FlowGraph`], the dataflow framework, DU chains and
//!   [`analyze_functions`] for parallel batches
//! - [`config`] - [`FlowConfig`], selecting which analyses run
//! - [`utils`] - Bit sets and DOT escaping
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: pipeline phases at `debug`,
//! per-block decisions at `trace`. It never installs a logger.

mod error;
pub(crate) use error::malformed_error;

pub mod analysis;
pub mod config;
pub mod prelude;
pub mod tac;
pub mod utils;

/// `tacflow` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `tacflow` Error type
///
/// # Examples
///
/// ```rust
/// use tacflow::{Error, FlowGraph, FunctionBuilder};
///
/// let mut fb = FunctionBuilder::new("broken");
/// let nowhere = fb.new_label();
/// fb.branch(nowhere);
///
/// match FlowGraph::new(fb.finish()) {
///     Err(Error::UnresolvedLabel(label)) => println!("no block for {label}"),
///     Err(e) => println!("Error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
pub use error::Error;

pub use analysis::{analyze_functions, FlowGraph};
pub use config::{Analyses, FlowConfig};
pub use tac::{BinaryOp, Function, FunctionBuilder, Label, Tac, Temp, UnaryOp};
