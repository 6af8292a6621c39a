use crate::error::{Result, SamplerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound accepted for the overlap tolerance
pub const MAX_OVERLAP: usize = 30;
/// Upper bound accepted for the prior shape parameter
pub const MAX_PRIOR_PARAM: u32 = 100;
/// Upper bound accepted for the number of sites per sequence
pub const MAX_PER_SEQ: usize = 1000;

/// Distribution family used for the prior on sites per sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorFamily {
    /// Poisson with rate equal to the prior parameter
    Poisson,
    /// Gamma with shape equal to the prior parameter and scale 1.0
    Gamma,
}

impl Default for PriorFamily {
    fn default() -> Self {
        PriorFamily::Poisson
    }
}

impl fmt::Display for PriorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorFamily::Poisson => write!(f, "poisson"),
            PriorFamily::Gamma => write!(f, "gamma"),
        }
    }
}

impl FromStr for PriorFamily {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "poisson" => Ok(PriorFamily::Poisson),
            "gamma" => Ok(PriorFamily::Gamma),
            _ => Err(SamplerError::invalid_parameter(
                "prior",
                s,
                "expected one of: poisson, gamma",
            )),
        }
    }
}

/// Order in which a sweep visits sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// Every sequence exactly once, in corpus order
    Sequential,
    /// N uniform draws with replacement
    Random,
}

impl Default for SweepMode {
    fn default() -> Self {
        SweepMode::Sequential
    }
}

/// Typed sampler parameters.
///
/// Every field has a default so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Amount of overlap allowed between two sites of one sequence
    pub overlap: usize,
    /// Prior distribution for the number of sites per sequence
    pub prior: PriorFamily,
    /// Expected mean number of sites per sequence (Poisson rate or Gamma shape)
    pub prior_param: u32,
    pub min_per_seq: usize,
    pub max_per_seq: usize,
    /// Take the arg-max instead of sampling motifs and positions
    pub deterministic: bool,
    pub sweep_mode: SweepMode,
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            overlap: 0,
            prior: PriorFamily::Poisson,
            prior_param: 1,
            min_per_seq: 0,
            max_per_seq: 20,
            deterministic: false,
            sweep_mode: SweepMode::Sequential,
            seed: 0x5eed,
        }
    }
}

impl SamplerConfig {
    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// The result is validated before it is returned.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SamplerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    /// * `SamplerError::InvalidParameter` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if self.overlap > MAX_OVERLAP {
            return Err(SamplerError::invalid_parameter(
                "overlap",
                self.overlap,
                format!("must be in 0..={}", MAX_OVERLAP),
            ));
        }
        if self.prior_param > MAX_PRIOR_PARAM {
            return Err(SamplerError::invalid_parameter(
                "prior_param",
                self.prior_param,
                format!("must be in 0..={}", MAX_PRIOR_PARAM),
            ));
        }
        if self.max_per_seq > MAX_PER_SEQ {
            return Err(SamplerError::invalid_parameter(
                "max_per_seq",
                self.max_per_seq,
                format!("must be in 0..={}", MAX_PER_SEQ),
            ));
        }
        if self.min_per_seq > self.max_per_seq {
            return Err(SamplerError::invalid_parameter(
                "min_per_seq",
                self.min_per_seq,
                format!("must not exceed max_per_seq ({})", self.max_per_seq),
            ));
        }
        Ok(())
    }
}
