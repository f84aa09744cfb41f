//! Three-address code: the instruction stream consumed by the analyses.
//!
//! The types here model what instruction generation hands to the dataflow
//! stage for one function:
//!
//! - [`Temp`] and [`Label`] - plain index identities
//! - [`Tac`] - one instruction, a closed enum with def/use accessors
//! - [`Function`] - the owned instruction arena plus per-label facts
//! - [`FunctionBuilder`] - fluent construction of a [`Function`]

mod builder;
mod function;
mod ids;
mod instruction;

pub use builder::FunctionBuilder;
pub use function::Function;
pub use ids::{Label, LabelInfo, Temp};
pub use instruction::{BinaryOp, Tac, UnaryOp};
