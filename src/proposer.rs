//! Per-sequence multi-site proposal.
//!
//! One call picks a target number of sites from the prior weighted by the
//! corpus histogram, then greedily draws motifs and positions until the
//! target is met, the placement budget runs out, or too little unclaimed
//! sequence remains. Every accepted site zeroes the profile over the window
//! it excludes, so later draws in the same call cannot overlap it.

use crate::config::SamplerConfig;
use crate::draw::{max_normalize, sample_index, sample_with_retry, where_max};
use crate::model::{SequenceModel, SiteStore};
use crate::prior::PriorModel;
use crate::types::Site;
use log::trace;
use rand::Rng;

/// Placement attempts allowed per call
pub const MAX_PLACEMENT_ATTEMPTS: usize = 1000;
/// Draws allowed when picking one motif or one position
pub const MAX_DRAW_RETRIES: usize = 100;
/// Added to the denominator of the motif weight transform
pub const WEIGHT_EPSILON: f64 = 0.001;

/// Result of resampling one sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// Number of sites drawn from the prior
    pub target: usize,
    /// Placement attempts consumed
    pub attempts: usize,
    /// Sites committed to the store, in acceptance order
    pub sites: Vec<Site>,
}

#[derive(Debug, Clone)]
pub struct SiteProposer {
    prior: PriorModel,
    overlap: usize,
    min_per_seq: usize,
    deterministic: bool,
}

impl SiteProposer {
    pub fn new(prior: PriorModel, config: &SamplerConfig) -> Self {
        Self {
            prior,
            overlap: config.overlap,
            min_per_seq: config.min_per_seq,
            deterministic: config.deterministic,
        }
    }

    pub fn prior(&self) -> &PriorModel {
        &self.prior
    }

    /// Weights for each candidate site count `k`:
    /// `(nsitestot[k] + sum(nsitestot)) * prior(k)`, max-normalized.
    pub fn target_weights(&self, nsitestot: &[usize]) -> Vec<f64> {
        let total: usize = nsitestot.iter().sum();
        let mut psite = vec![0.0; self.prior.max() + 1];
        for k in self.prior.min()..=self.prior.max() {
            let seen = nsitestot.get(k).copied().unwrap_or(0);
            psite[k] = (seen + total) as f64 * self.prior.pdf(k);
        }
        max_normalize(&mut psite);
        psite
    }

    /// Draws the number of sites to aim for; 0 when every weight vanishes.
    pub fn choose_target<R: Rng + ?Sized>(&self, nsitestot: &[usize], rng: &mut R) -> usize {
        sample_index(&self.target_weights(nsitestot), rng).unwrap_or(0)
    }

    /// Resamples the sites of `seq`, committing accepted ones to `store`.
    ///
    /// The store is expected to hold no sites for `seq` on entry; `nsitestot`
    /// is the histogram as it stood before those sites were removed.
    ///
    /// # Arguments
    /// * `seq` - Index of the sequence to resample
    /// * `model` - Source of the per-motif likelihood profiles of `seq`
    /// * `store` - Site store receiving accepted sites; its validity check is
    ///   consulted once `min_per_seq` sites have been accepted
    /// * `nsitestot` - Histogram of site counts used to weight the target draw
    /// * `rng` - Random source for the target, motif and position draws
    ///
    /// # Returns
    /// * `Proposal` - with:
    ///   - `target`: The number of sites aimed for
    ///   - `attempts`: Placement attempts spent, at most 1000
    ///   - `sites`: Accepted sites in acceptance order, never more than `target`
    pub fn sample<M, S, R>(
        &self,
        seq: usize,
        model: &M,
        store: &mut S,
        nsitestot: &[usize],
        rng: &mut R,
    ) -> Proposal
    where
        M: SequenceModel + ?Sized,
        S: SiteStore + ?Sized,
        R: Rng + ?Sized,
    {
        let target = self.choose_target(nsitestot, rng);
        let mut proposal = Proposal {
            target,
            attempts: 0,
            sites: Vec::new(),
        };

        let num_motifs = model.num_motifs();
        let width = model.motif_width();
        let len = model.sequence_len(seq);
        if num_motifs == 0 || target == 0 || len < width {
            return proposal;
        }

        let mut pm: Vec<Vec<f64>> = (0..num_motifs)
            .map(|motif| {
                let mut profile = model.compute_profile(seq, motif);
                profile.resize(len - width + 1, 0.0);
                for p in profile.iter_mut() {
                    if !(p.is_finite() && *p > 0.0) {
                        *p = 0.0;
                    }
                }
                profile
            })
            .collect();
        let mut mass: Vec<f64> = pm.iter().map(|p| p.iter().sum()).collect();
        let last = (len - width) as isize;
        let mut capacity = (len - width) as f64;
        let reach = width.saturating_sub(self.overlap).max(1) as isize;
        let min_span = (2 * width) as f64;

        while proposal.attempts < MAX_PLACEMENT_ATTEMPTS
            && proposal.sites.len() < target
            && capacity > min_span
        {
            proposal.attempts += 1;

            // entry 0 is background, entry m + 1 is motif m
            let mut weights = Vec::with_capacity(num_motifs + 1);
            weights.push(capacity);
            weights.extend(mass.iter().map(|&m| m.max(0.0)));
            max_normalize(&mut weights);
            for w in weights.iter_mut() {
                *w /= 1.0 - *w + WEIGHT_EPSILON;
            }
            max_normalize(&mut weights);

            let motif = if self.deterministic {
                where_max(&weights).and_then(|i| i.checked_sub(1))
            } else {
                sample_with_retry(&weights, MAX_DRAW_RETRIES, rng, |i| i > 0).map(|i| i - 1)
            };
            let Some(motif) = motif else {
                trace!("seq {}: no motif drawn", seq);
                continue;
            };

            let position = if self.deterministic {
                where_max(&pm[motif])
            } else {
                sample_with_retry(&pm[motif], MAX_DRAW_RETRIES, rng, |_| true)
            };
            let Some(position) = position else {
                trace!("seq {}: no position drawn for motif {}", seq, motif);
                continue;
            };

            if proposal.sites.len() >= self.min_per_seq && !store.is_site_valid(position, seq) {
                trace!("seq {}: position {} rejected by store", seq, position);
                continue;
            }

            let start = (position as isize - reach + 1).max(0);
            let end = (position as isize + reach).min(last + 1);
            for i in start..end {
                let i = i as usize;
                for (profile, m) in pm.iter_mut().zip(mass.iter_mut()) {
                    *m -= profile[i];
                    profile[i] = 0.0;
                }
                capacity -= 1.0;
            }

            store.add_site(seq, position, motif);
            proposal.sites.push(Site {
                seq,
                position,
                motif,
            });
        }

        proposal
    }
}
