//! Collaborator seams consumed by the sampler.

use crate::types::Site;

/// Sequence corpus plus the motif-vs-background scoring model.
pub trait SequenceModel {
    fn num_sequences(&self) -> usize;

    fn sequence_len(&self, seq: usize) -> usize;

    /// Window width shared by every motif
    fn motif_width(&self) -> usize;

    fn num_motifs(&self) -> usize;

    /// Relative likelihood (motif vs background) of a window of `motif`
    /// starting at each position of `seq`.
    ///
    /// The returned vector has one non-negative entry per window start,
    /// `sequence_len(seq) - motif_width() + 1` in total, or is empty when the
    /// sequence is shorter than one window.
    fn compute_profile(&self, seq: usize, motif: usize) -> Vec<f64>;
}

/// Storage for accepted sites.
pub trait SiteStore {
    /// Opaque saved state used by sampler snapshots
    type Snapshot: Clone;

    fn add_site(&mut self, seq: usize, position: usize, motif: usize);

    fn remove_all_sites(&mut self, seq: usize);

    fn site_count(&self, seq: usize) -> usize;

    /// Whether a new site may start at `position` of `seq`
    fn is_site_valid(&self, position: usize, seq: usize) -> bool;

    fn sites(&self, seq: usize) -> Vec<Site>;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: &Self::Snapshot);
}
