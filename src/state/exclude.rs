use std::collections::{BTreeSet, HashSet};

/// Lookup of item ids that discovery must skip
///
/// The set is owned outside the engine; the engine only reads it.
pub trait ExcludeSet: Send + Sync {
    fn contains(&self, id: u64) -> bool;
}

/// Excludes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExclusions;

impl ExcludeSet for NoExclusions {
    fn contains(&self, _id: u64) -> bool {
        false
    }
}

impl ExcludeSet for HashSet<u64> {
    fn contains(&self, id: u64) -> bool {
        HashSet::contains(self, &id)
    }
}

impl ExcludeSet for BTreeSet<u64> {
    fn contains(&self, id: u64) -> bool {
        BTreeSet::contains(self, &id)
    }
}
