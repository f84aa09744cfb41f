//! Identities for temporaries and branch labels.
//!
//! Both are plain indices scoped to one [`crate::Function`]. They carry no
//! mutable state: anything an analysis needs to remember about a temp or a
//! label lives in a table owned by that analysis or by the function.

use std::fmt;

/// A three-address temporary.
///
/// Temps are totally ordered by their index, which is also the key used by
/// every [`crate::analysis::VarSet`]. Within one function the indices are
/// dense, starting at zero.
///
/// # Examples
///
/// ```rust
/// use tacflow::Temp;
///
/// let t = Temp::new(3);
/// assert_eq!(t.index(), 3);
/// assert_eq!(t.to_string(), "_T3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temp(u32);

impl Temp {
    /// Creates a temp with the given index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index of this temp.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_T{}", self.0)
    }
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_T{}", self.0)
    }
}

/// A branch-target marker.
///
/// The label itself is only a handle; whether it is targeted by a branch and
/// which basic block it starts are recorded in the owning function's
/// [`LabelInfo`] table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(u32);

impl Label {
    /// Creates a label with the given index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index of this label.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_L{}", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_L{}", self.0)
    }
}

/// Per-label facts kept by a [`crate::Function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelInfo {
    /// `true` if some branch in the function targets this label.
    pub targeted: bool,
    /// Index of the basic block that begins at this label.
    ///
    /// `None` until the function has been partitioned, and afterwards for
    /// labels that do not start a reachable block.
    pub block: Option<usize>,
}
