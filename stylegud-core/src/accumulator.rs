//! Run-scoped collection of validated entries from every backend.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::entry::{Dataset, StyleGuideEntry};

/// Merges validated batches from concurrently running backend wrappers.
///
/// Construct one per pipeline run and drop it when the run ends. Each
/// [`accumulate`](Self::accumulate) call appends its whole batch under the lock, so
/// batches never interleave. Ordering is only imposed by [`data`](Self::data).
#[derive(Debug, Default)]
pub struct Accumulator {
    entries: Mutex<Vec<StyleGuideEntry>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StyleGuideEntry>> {
        // Appends and sorts cannot leave the vector half-updated, so a poisoned lock is still usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends every entry of `batch`. No deduplication.
    pub fn accumulate(&self, batch: Vec<StyleGuideEntry>) {
        let mut entries = self.lock();
        let added = batch.len();
        entries.extend(batch);
        debug!(added, total = entries.len(), "Accumulated batch");
    }

    /// All accumulated entries sorted by reference, case-insensitively, ascending.
    ///
    /// The sort is stable and re-derived on every call.
    pub fn data(&self) -> Dataset {
        let mut entries = self.lock();
        entries.sort_by_cached_key(StyleGuideEntry::sort_key);
        entries.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(reference: &str) -> StyleGuideEntry {
        StyleGuideEntry::new(format!("Entry {reference}"), reference, "html")
    }

    fn references(data: &[StyleGuideEntry]) -> Vec<&str> {
        data.iter().map(|e| e.reference.as_str()).collect()
    }

    #[test]
    fn data_is_sorted_case_insensitively() {
        let acc = Accumulator::new();
        acc.accumulate(vec![entry("b.2"), entry("A.1")]);
        acc.accumulate(vec![entry("a.0"), entry("B.1")]);

        let data = acc.data();
        assert_eq!(references(&data), ["a.0", "A.1", "B.1", "b.2"]);
        for pair in data.windows(2) {
            assert!(pair[0].sort_key() <= pair[1].sort_key());
        }
    }

    #[test]
    fn repeated_reads_are_identical() {
        let acc = Accumulator::new();
        acc.accumulate(vec![entry("3"), entry("1"), entry("2")]);
        assert_eq!(acc.data(), acc.data());
    }

    #[test]
    fn duplicates_are_kept() {
        let acc = Accumulator::new();
        acc.accumulate(vec![entry("1.1")]);
        acc.accumulate(vec![entry("1.1")]);
        assert_eq!(acc.len(), 2);
        assert_eq!(references(&acc.data()), ["1.1", "1.1"]);
    }

    #[test]
    fn empty_accumulator_yields_empty_data() {
        let acc = Accumulator::new();
        assert!(acc.is_empty());
        assert!(acc.data().is_empty());
    }
}
