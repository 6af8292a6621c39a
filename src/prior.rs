use crate::config::{PriorFamily, MAX_PER_SEQ};
use crate::error::{Result, SamplerError};
use statrs::distribution::{Continuous, Discrete, Gamma, Poisson};

/// Truncated prior over the number of sites per sequence.
///
/// The family's mass (or density) is evaluated at every integer in
/// `[min, max]` and renormalized over that range only. Entries below `min`
/// are zero so the table can be indexed directly by site count.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorModel {
    family: PriorFamily,
    param: u32,
    min: usize,
    pdf: Vec<f64>,
}

impl PriorModel {
    /// Builds the renormalized prior.
    ///
    /// # Errors
    /// * `SamplerError::InvalidParameter` - if statrs rejects the parameter
    ///   (a zero Poisson rate or Gamma shape), or if `max` exceeds
    ///   [`MAX_PER_SEQ`] or `min` exceeds `max`
    /// * `SamplerError::DegeneratePrior` - if the mass over the range is zero
    ///   or not finite
    pub fn build(family: PriorFamily, param: u32, min: usize, max: usize) -> Result<Self> {
        if max > MAX_PER_SEQ {
            return Err(SamplerError::invalid_parameter(
                "max_per_seq",
                max,
                format!("must be in 0..={}", MAX_PER_SEQ),
            ));
        }
        if min > max {
            return Err(SamplerError::invalid_parameter(
                "min_per_seq",
                min,
                format!("must not exceed max_per_seq ({})", max),
            ));
        }

        let mut pdf = vec![0.0; max + 1];
        match family {
            PriorFamily::Poisson => {
                let poi = Poisson::new(param as f64).map_err(|e| {
                    SamplerError::invalid_parameter("prior_param", param, e.to_string())
                })?;
                for (k, p) in pdf.iter_mut().enumerate().skip(min) {
                    *p = poi.pmf(k as u64);
                }
            }
            PriorFamily::Gamma => {
                let gam = Gamma::new(param as f64, 1.0).map_err(|e| {
                    SamplerError::invalid_parameter("prior_param", param, e.to_string())
                })?;
                for (k, p) in pdf.iter_mut().enumerate().skip(min) {
                    *p = gam.pdf(k as f64);
                }
            }
        }

        let sum: f64 = pdf.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(SamplerError::DegeneratePrior {
                family: family.to_string(),
                param,
                min,
                max,
                sum,
            });
        }
        pdf.iter_mut().for_each(|p| *p /= sum);

        Ok(Self {
            family,
            param,
            min,
            pdf,
        })
    }

    pub fn family(&self) -> PriorFamily {
        self.family
    }

    pub fn param(&self) -> u32 {
        self.param
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.pdf.len() - 1
    }

    /// Probability of `k` sites; zero outside `[min, max]`.
    pub fn pdf(&self, k: usize) -> f64 {
        self.pdf.get(k).copied().unwrap_or(0.0)
    }

    /// The full table indexed by site count, `0..=max`
    pub fn as_slice(&self) -> &[f64] {
        &self.pdf
    }
}
