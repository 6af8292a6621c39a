#![allow(dead_code)]

use multisite_sampler::store::MemorySiteStore;
use multisite_sampler::{SequenceModel, Site, SiteStore};
use std::cell::Cell;

/// Sequence model that hands out fixed profiles, one per (sequence, motif).
#[derive(Debug, Clone)]
pub struct FixedModel {
    pub lengths: Vec<usize>,
    pub width: usize,
    pub profiles: Vec<Vec<Vec<f64>>>,
}

impl FixedModel {
    /// Single motif, flat profile of weight 1 at every window start.
    pub fn flat(lengths: Vec<usize>, width: usize) -> Self {
        let profiles = lengths
            .iter()
            .map(|&len| vec![vec![1.0; (len + 1).saturating_sub(width)]])
            .collect();
        Self {
            lengths,
            width,
            profiles,
        }
    }

    /// Single motif with weight only at `positions` of one sequence.
    pub fn peaks(len: usize, width: usize, positions: &[usize], weight: f64) -> Self {
        let mut profile = vec![0.0; len - width + 1];
        for &p in positions {
            profile[p] = weight;
        }
        Self {
            lengths: vec![len],
            width,
            profiles: vec![vec![profile]],
        }
    }

    pub fn store(&self, overlap: usize) -> MemorySiteStore {
        MemorySiteStore::new(self.lengths.clone(), self.width, overlap)
    }
}

impl SequenceModel for FixedModel {
    fn num_sequences(&self) -> usize {
        self.lengths.len()
    }

    fn sequence_len(&self, seq: usize) -> usize {
        self.lengths[seq]
    }

    fn motif_width(&self) -> usize {
        self.width
    }

    fn num_motifs(&self) -> usize {
        self.profiles.first().map_or(0, Vec::len)
    }

    fn compute_profile(&self, seq: usize, motif: usize) -> Vec<f64> {
        self.profiles[seq][motif].clone()
    }
}

/// Site store whose validity predicate refuses every position and counts
/// how often it was asked.
#[derive(Debug)]
pub struct RejectingStore {
    pub inner: MemorySiteStore,
    pub checks: Cell<usize>,
}

impl RejectingStore {
    pub fn new(inner: MemorySiteStore) -> Self {
        Self {
            inner,
            checks: Cell::new(0),
        }
    }
}

impl SiteStore for RejectingStore {
    type Snapshot = Vec<Vec<Site>>;

    fn add_site(&mut self, seq: usize, position: usize, motif: usize) {
        self.inner.add_site(seq, position, motif);
    }

    fn remove_all_sites(&mut self, seq: usize) {
        self.inner.remove_all_sites(seq);
    }

    fn site_count(&self, seq: usize) -> usize {
        self.inner.site_count(seq)
    }

    fn is_site_valid(&self, _position: usize, _seq: usize) -> bool {
        self.checks.set(self.checks.get() + 1);
        false
    }

    fn sites(&self, seq: usize) -> Vec<Site> {
        self.inner.sites(seq)
    }

    fn snapshot(&self) -> Self::Snapshot {
        self.inner.snapshot()
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) {
        self.inner.restore(snapshot);
    }
}
