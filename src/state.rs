use serde::{Deserialize, Serialize};

/// Owned copy of the tracker's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSnapshot {
    pub nmots: Vec<usize>,
    pub nsitestot: Vec<usize>,
}

impl CountSnapshot {
    pub fn total_sites(&self) -> usize {
        self.nmots.iter().sum()
    }
}

/// Saved sampler state: the counters plus whatever the site store keeps.
///
/// The site half is opaque here; it is produced and consumed by the store's
/// own snapshot logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerState<S> {
    pub counts: CountSnapshot,
    pub sites: S,
}

impl<S: Clone> SamplerState<S> {
    pub fn total_sites(&self) -> usize {
        self.counts.total_sites()
    }
}

/// Deep-copies `from` into `to` without reallocating the count arrays.
///
/// # Panics
/// * if the two bundles were taken from differently sized samplers
pub fn copy_state<S: Clone>(to: &mut SamplerState<S>, from: &SamplerState<S>) {
    to.counts.nmots.copy_from_slice(&from.counts.nmots);
    to.counts.nsitestot.copy_from_slice(&from.counts.nsitestot);
    to.sites.clone_from(&from.sites);
}
