//! Sets of temps.

use std::fmt;

use crate::{tac::Temp, utils::BitSet};

/// A set of [`Temp`]s keyed by temp index.
///
/// Every set belonging to one function has the same capacity (the function's
/// temp count). Temps beyond the capacity are treated as never present:
/// inserting one is a no-op.
///
/// # Examples
///
/// ```rust
/// use tacflow::{analysis::VarSet, Temp};
///
/// let mut live = VarSet::new(8);
/// live.insert(Temp::new(5));
/// live.insert(Temp::new(1));
///
/// assert!(live.contains(Temp::new(5)));
/// assert_eq!(live.iter().collect::<Vec<_>>(), vec![Temp::new(1), Temp::new(5)]);
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub struct VarSet {
    bits: BitSet,
}

impl VarSet {
    /// Creates an empty set for a function with `temp_count` temps.
    #[must_use]
    pub fn new(temp_count: usize) -> Self {
        Self {
            bits: BitSet::new(temp_count),
        }
    }

    /// Adds `temp`, returning `true` if it was not present.
    pub fn insert(&mut self, temp: Temp) -> bool {
        temp.index() < self.bits.len() && self.bits.insert(temp.index())
    }

    /// Removes `temp`, returning `true` if it was present.
    pub fn remove(&mut self, temp: Temp) -> bool {
        temp.index() < self.bits.len() && self.bits.remove(temp.index())
    }

    /// Returns `true` if `temp` is in the set.
    #[must_use]
    pub fn contains(&self, temp: Temp) -> bool {
        self.bits.contains(temp.index())
    }

    /// Returns the number of temps in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.count()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns the capacity (temp count) this set was created with.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Iterates over the temps in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Temp> + '_ {
        self.bits.iter().map(|idx| Temp::new(idx as u32))
    }

    /// In-place union. Returns `true` if `self` grew.
    pub fn union_with(&mut self, other: &Self) -> bool {
        self.bits.union_with(&other.bits)
    }

    /// In-place difference. Returns `true` if `self` shrank.
    pub fn difference_with(&mut self, other: &Self) -> bool {
        self.bits.difference_with(&other.bits)
    }

    /// Returns `true` if every temp in `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits.is_subset(&other.bits)
    }
}

impl fmt::Debug for VarSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for VarSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[ ")?;
        for temp in self.iter() {
            write!(f, "{temp} ")?;
        }
        f.write_str("]")
    }
}

impl Extend<Temp> for VarSet {
    fn extend<I: IntoIterator<Item = Temp>>(&mut self, iter: I) {
        for temp in iter {
            self.insert(temp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varset_insert_remove() {
        let mut set = VarSet::new(10);
        assert!(set.is_empty());
        assert!(set.insert(Temp::new(0)));
        assert!(!set.insert(Temp::new(0)));
        assert!(set.insert(Temp::new(9)));
        assert_eq!(set.len(), 2);

        assert!(set.remove(Temp::new(0)));
        assert!(!set.contains(Temp::new(0)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_varset_out_of_capacity_is_ignored() {
        let mut set = VarSet::new(2);
        assert!(!set.insert(Temp::new(7)));
        assert!(!set.contains(Temp::new(7)));
        assert!(!set.remove(Temp::new(7)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_varset_display() {
        let mut set = VarSet::new(4);
        set.extend([Temp::new(3), Temp::new(1)]);
        assert_eq!(set.to_string(), "[ _T1 _T3 ]");
        assert_eq!(VarSet::new(4).to_string(), "[ ]");
    }
}
