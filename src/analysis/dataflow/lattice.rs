//! Lattice abstraction for data flow values.
//!
//! A data flow analysis needs a way to combine the values that reach a
//! control-flow merge point. For the backward analyses in this crate that
//! merge point is a block with several successors, and combining is the
//! meet operation of a semi-lattice.

use std::fmt::Debug;

use crate::analysis::VarSet;

/// A meet semi-lattice with a meet (greatest lower bound) operation.
///
/// The meet operation combines information from multiple control flow paths.
/// It must satisfy:
///
/// - **Idempotent**: `x.meet(x) = x`
/// - **Commutative**: `x.meet(y) = y.meet(x)`
/// - **Associative**: `x.meet(y.meet(z)) = (x.meet(y)).meet(z)`
///
/// # Examples
///
/// ```rust
/// use tacflow::analysis::{MeetSemiLattice, VarSet};
/// use tacflow::Temp;
///
/// let mut a = VarSet::new(4);
/// a.insert(Temp::new(0));
/// let mut b = VarSet::new(4);
/// b.insert(Temp::new(2));
///
/// let merged = a.meet(&b);
/// assert_eq!(merged.len(), 2);
/// ```
pub trait MeetSemiLattice: Clone + Debug + PartialEq {
    /// Computes the meet (greatest lower bound) of two lattice elements.
    ///
    /// The meet represents combining information from two paths that merge.
    #[must_use]
    fn meet(&self, other: &Self) -> Self;
}

/// Sets of temps ordered by reverse inclusion: "may be live" information is
/// merged by union.
impl MeetSemiLattice for VarSet {
    fn meet(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.union_with(other);
        result
    }
}
