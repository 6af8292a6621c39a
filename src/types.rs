use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Represents a Position Weight Matrix (PWM)
/// Stored as a (width x 4) array with columns A, C, G, T
pub type Pwm = Array2<f64>;

/// Named PWMs in file order
pub type PwmCollection = Vec<(String, Pwm)>;

/// A claimed motif occurrence: window start `position` in sequence `seq`,
/// assigned to motif `motif` (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Site {
    pub seq: usize,
    pub position: usize,
    pub motif: usize,
}

/// A single FASTA entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub label: String,
    pub sequence: String,
}
