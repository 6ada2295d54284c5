// src/engine/pending.rs

use std::path::{Path, PathBuf};

/// The working set of files still eligible for dispatch.
///
/// Entries are removed by tombstoning their slot: positions never shift and
/// the remaining files keep their original relative order. The dispatch
/// pass relies on this, since every rule walks the same positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSet {
    slots: Vec<Option<PathBuf>>,
}

impl PendingSet {
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            slots: files.into_iter().map(|p| Some(p.into())).collect(),
        }
    }

    /// Number of positions, including tombstoned ones.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The file at `pos`, or `None` if the slot was taken (or is out of
    /// range).
    pub fn get(&self, pos: usize) -> Option<&Path> {
        self.slots.get(pos).and_then(|s| s.as_deref())
    }

    /// Remove and return the file at `pos`, leaving a tombstone.
    pub fn take(&mut self, pos: usize) -> Option<PathBuf> {
        self.slots.get_mut(pos).and_then(Option::take)
    }

    /// Files not dispatched so far, in original order.
    pub fn remaining(&self) -> impl Iterator<Item = &Path> {
        self.slots.iter().filter_map(|s| s.as_deref())
    }

    pub fn remaining_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_exhausted(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for PendingSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter)
    }
}
