use crate::model::SiteStore;
use crate::types::Site;

/// In-memory site lists, one per sequence, kept sorted by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySiteStore {
    lengths: Vec<usize>,
    width: usize,
    overlap: usize,
    sites: Vec<Vec<Site>>,
}

impl MemorySiteStore {
    pub fn new(lengths: Vec<usize>, width: usize, overlap: usize) -> Self {
        let sites = vec![Vec::new(); lengths.len()];
        Self {
            lengths,
            width,
            overlap,
            sites,
        }
    }

    /// Minimum distance between two site starts
    pub fn min_spacing(&self) -> usize {
        self.width.saturating_sub(self.overlap).max(1)
    }

    pub fn total_sites(&self) -> usize {
        self.sites.iter().map(Vec::len).sum()
    }
}

impl SiteStore for MemorySiteStore {
    type Snapshot = Vec<Vec<Site>>;

    fn add_site(&mut self, seq: usize, position: usize, motif: usize) {
        let site = Site {
            seq,
            position,
            motif,
        };
        let list = &mut self.sites[seq];
        let at = list.partition_point(|s| s.position < position);
        list.insert(at, site);
    }

    fn remove_all_sites(&mut self, seq: usize) {
        self.sites[seq].clear();
    }

    fn site_count(&self, seq: usize) -> usize {
        self.sites[seq].len()
    }

    /// In bounds and at least [`MemorySiteStore::min_spacing`] away from
    /// every site already in `seq`.
    fn is_site_valid(&self, position: usize, seq: usize) -> bool {
        if position + self.width > self.lengths[seq] {
            return false;
        }
        let spacing = self.min_spacing();
        self.sites[seq]
            .iter()
            .all(|s| s.position.abs_diff(position) >= spacing)
    }

    fn sites(&self, seq: usize) -> Vec<Site> {
        self.sites[seq].clone()
    }

    fn snapshot(&self) -> Self::Snapshot {
        self.sites.clone()
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) {
        assert_eq!(
            snapshot.len(),
            self.sites.len(),
            "snapshot covers a different number of sequences"
        );
        self.sites.clone_from(snapshot);
    }
}
