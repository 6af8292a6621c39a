//! Multi-site Gibbs sampling for motif discovery.
//!
//! Each sequence may hold several motif sites. The number of sites is drawn
//! from a truncated Poisson or Gamma prior reweighted by how many sequences
//! currently hold each count, then sites are placed greedily from the
//! motif-vs-background profile without overlapping each other.

pub mod config;
pub mod counts;
pub mod draw;
pub mod error;
pub mod fasta;
pub mod model;
pub mod prior;
pub mod proposer;
pub mod pwm;
pub mod sampler;
pub mod state;
pub mod store;
pub mod types;

pub use config::{PriorFamily, SamplerConfig, SweepMode};
pub use error::{Result, SamplerError};
pub use model::{SequenceModel, SiteStore};
pub use sampler::{MultiSampler, SweepReport};
pub use types::Site;
