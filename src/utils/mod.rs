//! Small shared utilities.

mod bitset;
mod dot;

pub use bitset::{BitSet, BitSetIter};
pub use dot::escape_dot;
