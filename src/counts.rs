use crate::state::CountSnapshot;

/// Per-sequence site counts and the corpus-wide histogram of those counts.
///
/// `nsitestot[k]` is the number of sequences currently holding exactly `k`
/// sites. A sequence being resampled keeps its old histogram contribution
/// between [`CountTracker::remove`] and [`CountTracker::add`], so the site
/// proposer sees the histogram as it was before the removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTracker {
    nmots: Vec<usize>,
    nsitestot: Vec<usize>,
    pending: Vec<Option<usize>>,
}

impl CountTracker {
    pub fn new(num_sequences: usize, max_per_seq: usize) -> Self {
        Self {
            nmots: vec![0; num_sequences],
            nsitestot: vec![0; max_per_seq + 1],
            pending: vec![None; num_sequences],
        }
    }

    /// Zeroes both arrays and forgets any pending removal.
    pub fn reset(&mut self) {
        self.nmots.iter_mut().for_each(|n| *n = 0);
        self.nsitestot.iter_mut().for_each(|n| *n = 0);
        self.pending.iter_mut().for_each(|p| *p = None);
    }

    /// Records an already-present sequence count during full re-derivation.
    ///
    /// # Panics
    /// * if `count` exceeds the histogram range
    pub fn record(&mut self, seq: usize, count: usize) {
        assert!(
            count < self.nsitestot.len(),
            "sequence {} holds {} sites, above the configured maximum {}",
            seq,
            count,
            self.nsitestot.len() - 1
        );
        self.nmots[seq] = count;
        self.nsitestot[count] += 1;
    }

    /// Clears the per-sequence count of `seq` ahead of resampling.
    ///
    /// The histogram is left alone. Calling this again before
    /// [`CountTracker::add`] changes nothing.
    pub fn remove(&mut self, seq: usize) {
        if self.pending[seq].is_none() {
            self.pending[seq] = Some(self.nmots[seq]);
        }
        self.nmots[seq] = 0;
    }

    /// Sets the count of a resampled sequence and moves its histogram
    /// contribution to `count`.
    ///
    /// # Arguments
    /// * `seq` - Sequence index, previously passed to [`CountTracker::remove`]
    /// * `count` - Number of sites the sequence holds after resampling
    ///
    /// # Returns
    /// * Nothing; `nmots[seq]` becomes `count`, the histogram entry for the
    ///   pre-removal count drops by one and the entry for `count` gains one
    ///
    /// # Panics
    /// * if `seq` has no pending [`CountTracker::remove`]
    /// * if `count` exceeds the histogram range
    pub fn add(&mut self, seq: usize, count: usize) {
        let previous = self.pending[seq]
            .take()
            .unwrap_or_else(|| panic!("add({}) without a matching remove", seq));
        assert!(
            count < self.nsitestot.len(),
            "sequence {} resampled to {} sites, above the configured maximum {}",
            seq,
            count,
            self.nsitestot.len() - 1
        );
        self.nsitestot[previous] = self.nsitestot[previous]
            .checked_sub(1)
            .unwrap_or_else(|| panic!("histogram has no sequence with {} sites", previous));
        self.nmots[seq] = count;
        self.nsitestot[count] += 1;
    }

    pub fn count(&self, seq: usize) -> usize {
        self.nmots[seq]
    }

    pub fn nmots(&self) -> &[usize] {
        &self.nmots
    }

    pub fn nsitestot(&self) -> &[usize] {
        &self.nsitestot
    }

    /// Sum of the histogram, i.e. the number of sequences it accounts for
    pub fn histogram_total(&self) -> usize {
        self.nsitestot.iter().sum()
    }

    pub fn total_sites(&self) -> usize {
        self.nmots.iter().sum()
    }

    pub fn num_sequences(&self) -> usize {
        self.nmots.len()
    }

    pub fn snapshot(&self) -> CountSnapshot {
        CountSnapshot {
            nmots: self.nmots.clone(),
            nsitestot: self.nsitestot.clone(),
        }
    }

    /// Overwrites the counters from `snapshot`.
    ///
    /// # Panics
    /// * if the snapshot was taken from a differently sized tracker
    pub fn restore(&mut self, snapshot: &CountSnapshot) {
        self.nmots.copy_from_slice(&snapshot.nmots);
        self.nsitestot.copy_from_slice(&snapshot.nsitestot);
        self.pending.iter_mut().for_each(|p| *p = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_add_keeps_histogram_total() {
        let mut tracker = CountTracker::new(3, 4);
        for seq in 0..3 {
            tracker.record(seq, seq);
        }
        assert_eq!(tracker.histogram_total(), 3);

        tracker.remove(2);
        assert_eq!(tracker.count(2), 0);
        assert_eq!(tracker.nsitestot(), &[1, 1, 1, 0, 0]);

        tracker.add(2, 4);
        assert_eq!(tracker.nsitestot(), &[1, 1, 0, 0, 1]);
        assert_eq!(tracker.histogram_total(), 3);
        assert_eq!(tracker.total_sites(), 5);
    }

    #[test]
    fn test_remove_on_empty_sequence_keeps_histogram() {
        let mut tracker = CountTracker::new(3, 2);
        tracker.record(0, 0);
        tracker.record(1, 1);
        tracker.record(2, 2);

        tracker.remove(0);
        assert_eq!(tracker.count(0), 0);
        assert_eq!(tracker.nsitestot(), &[1, 1, 1]);

        tracker.add(0, 0);
        assert_eq!(tracker.nsitestot(), &[1, 1, 1]);
        assert_eq!(tracker.histogram_total(), 3);
    }

    #[test]
    fn test_double_remove_is_noop() {
        let mut tracker = CountTracker::new(2, 2);
        tracker.record(0, 2);
        tracker.record(1, 0);
        tracker.remove(0);
        tracker.remove(0);
        tracker.add(0, 1);
        assert_eq!(tracker.nsitestot(), &[1, 1, 0]);
    }

    #[test]
    #[should_panic(expected = "without a matching remove")]
    fn test_add_without_remove_panics() {
        let mut tracker = CountTracker::new(1, 2);
        tracker.add(0, 1);
    }

    #[test]
    fn test_reset() {
        let mut tracker = CountTracker::new(2, 3);
        tracker.record(0, 3);
        tracker.record(1, 1);
        tracker.reset();
        assert_eq!(tracker.nmots(), &[0, 0]);
        assert_eq!(tracker.histogram_total(), 0);
    }
}
