use crate::config::{SamplerConfig, SweepMode};
use crate::counts::CountTracker;
use crate::error::Result;
use crate::model::{SequenceModel, SiteStore};
use crate::prior::PriorModel;
use crate::proposer::{Proposal, SiteProposer};
use crate::state::SamplerState;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Totals for one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Sequences resampled (N, counting repeats in random mode)
    pub steps: usize,
    /// Sites accepted across all steps
    pub sites_accepted: usize,
    /// Placement attempts consumed across all steps
    pub attempts: usize,
}

/// Multi-site Gibbs sampler over a corpus.
///
/// Owns its counters and random source; run parallel chains by building one
/// sampler per chain.
pub struct MultiSampler<M, S> {
    config: SamplerConfig,
    model: M,
    store: S,
    proposer: SiteProposer,
    counts: CountTracker,
    rng: StdRng,
}

impl<M: SequenceModel, S: SiteStore> MultiSampler<M, S> {
    /// Validates `config`, builds the prior and derives counts from `store`.
    ///
    /// # Errors
    /// * `SamplerError::InvalidParameter` - out-of-range configuration
    /// * `SamplerError::DegeneratePrior` - the prior has no mass over the range
    pub fn new(config: SamplerConfig, model: M, store: S) -> Result<Self> {
        config.validate()?;
        let prior = PriorModel::build(
            config.prior,
            config.prior_param,
            config.min_per_seq,
            config.max_per_seq,
        )?;

        debug!(
            "{} prior (param {}) over [{}, {}]: {:?}",
            prior.family(),
            prior.param(),
            prior.min(),
            prior.max(),
            &prior.as_slice()[prior.min()..]
        );

        let width = model.motif_width();
        let short = (0..model.num_sequences())
            .filter(|&i| model.sequence_len(i) <= 3 * width)
            .count();
        if short > 0 {
            warn!(
                "{} sequences are too short to receive sites (length <= {})",
                short,
                3 * width
            );
        }

        let counts = CountTracker::new(model.num_sequences(), config.max_per_seq);
        let rng = StdRng::seed_from_u64(config.seed);
        let mut sampler = Self {
            proposer: SiteProposer::new(prior, &config),
            config,
            model,
            store,
            counts,
            rng,
        };
        sampler.rederive_counts();
        Ok(sampler)
    }

    /// Rebuilds both counters from the site store.
    pub fn rederive_counts(&mut self) {
        self.counts.reset();
        for seq in 0..self.model.num_sequences() {
            let n = self.store.site_count(seq);
            self.counts.record(seq, n);
        }
    }

    /// Drops every site and starts the counters over.
    pub fn reset_sites(&mut self) {
        for seq in 0..self.model.num_sequences() {
            self.store.remove_all_sites(seq);
        }
        self.rederive_counts();
    }

    /// Removes, resamples and recounts a single sequence.
    ///
    /// # Panics
    /// * if `seq` is not a corpus index
    pub fn step(&mut self, seq: usize) -> Proposal {
        assert!(
            seq < self.model.num_sequences(),
            "sequence index {} out of range ({} sequences)",
            seq,
            self.model.num_sequences()
        );
        self.counts.remove(seq);
        self.store.remove_all_sites(seq);
        let proposal = self.proposer.sample(
            seq,
            &self.model,
            &mut self.store,
            self.counts.nsitestot(),
            &mut self.rng,
        );
        let n = self.store.site_count(seq);
        self.counts.add(seq, n);
        trace!(
            "seq {}: target {}, accepted {} in {} attempts",
            seq,
            proposal.target,
            proposal.sites.len(),
            proposal.attempts
        );
        proposal
    }

    /// One pass over the corpus in the given order.
    ///
    /// # Arguments
    /// * `mode` - `Sequential` steps every sequence once in corpus order;
    ///   `Random` takes as many uniformly drawn steps, with replacement
    ///
    /// # Returns
    /// * `SweepReport` - with:
    ///   - `steps`: Number of sequences resampled
    ///   - `sites_accepted`: Sites held after their step, summed over steps
    ///   - `attempts`: Placement attempts spent across all steps
    pub fn run_sweep(&mut self, mode: SweepMode) -> SweepReport {
        let n = self.model.num_sequences();
        let mut report = SweepReport::default();
        for i in 0..n {
            let seq = match mode {
                SweepMode::Sequential => i,
                SweepMode::Random => self.rng.gen_range(0..n),
            };
            let proposal = self.step(seq);
            report.steps += 1;
            report.sites_accepted += proposal.sites.len();
            report.attempts += proposal.attempts;
        }
        debug!(
            "{:?} sweep: {} steps, {} sites accepted, {} total sites",
            mode,
            report.steps,
            report.sites_accepted,
            self.counts.total_sites()
        );
        report
    }

    /// Runs `sweeps` sweeps in the configured mode.
    pub fn run(&mut self, sweeps: usize) -> Vec<SweepReport> {
        let mode = self.config.sweep_mode;
        (0..sweeps).map(|_| self.run_sweep(mode)).collect()
    }

    /// Owned copy of the counters and the store's sites.
    pub fn snapshot(&self) -> SamplerState<S::Snapshot> {
        SamplerState {
            counts: self.counts.snapshot(),
            sites: self.store.snapshot(),
        }
    }

    pub fn restore(&mut self, state: &SamplerState<S::Snapshot>) {
        self.counts.restore(&state.counts);
        self.store.restore(&state.sites);
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn prior(&self) -> &PriorModel {
        self.proposer.prior()
    }

    pub fn counts(&self) -> &CountTracker {
        &self.counts
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
