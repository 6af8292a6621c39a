use crate::error::{Result, SamplerError};
use crate::fasta::rev_comp;
use crate::model::SequenceModel;
use crate::types::{FastaRecord, Pwm, PwmCollection};
use ndarray::{Array2, Axis};
use phf::phf_map;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::Peekable;

const PSEUDOCOUNT: f64 = 0.0001;

/// Column of each nucleotide in a [`Pwm`]
pub static BASE_INDEX: phf::Map<char, usize> = phf_map! {
    'A' => 0,
    'C' => 1,
    'G' => 2,
    'T' => 3,
};

/// Advances the iterator until a MOTIF line is found
fn skip_until_motif<I>(lines: &mut Peekable<I>)
where
    I: Iterator<Item = std::result::Result<String, std::io::Error>>,
{
    while let Some(Ok(line)) = lines.peek() {
        if line.starts_with("MOTIF") {
            break;
        }
        lines.next();
    }
}

fn parse_row(line: &str) -> Option<Vec<f64>> {
    let values: Vec<f64> = line
        .split_whitespace()
        .map(|s| s.parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    (values.len() == 4).then_some(values)
}

/// Parses a single PWM from the iterator
fn parse_pwm<I>(lines: &mut Peekable<I>) -> Result<Option<(String, Pwm)>>
where
    I: Iterator<Item = std::result::Result<String, std::io::Error>>,
{
    // Get motif ID from MOTIF line
    let motif_line = match lines.next() {
        Some(Ok(line)) if line.starts_with("MOTIF") => line,
        Some(Err(e)) => return Err(SamplerError::Io(e)),
        _ => return Ok(None),
    };

    let motif_id = motif_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| SamplerError::InvalidFileFormat("Missing motif ID".into()))?
        .to_string();

    // Skip to the matrix header
    while let Some(line) = lines.next() {
        if line?.trim_start().starts_with("letter-probability") {
            break;
        }
    }

    let mut rows: Vec<f64> = Vec::new();
    while let Some(Ok(line)) = lines.peek() {
        match parse_row(line) {
            Some(values) => rows.extend(values),
            None if line.trim().is_empty() && rows.is_empty() => {}
            None => break,
        }
        lines.next();
    }

    if rows.is_empty() {
        return Err(SamplerError::invalid_pwm(format!("Empty PWM for {}", motif_id)));
    }

    let pwm = Array2::from_shape_vec((rows.len() / 4, 4), rows)
        .map_err(|e| SamplerError::invalid_pwm(e.to_string()))?;

    Ok(Some((motif_id, pwm)))
}

/// Reads Position Weight Matrices (PWMs) from a MEME format file
///
/// Each PWM is preceded by a "MOTIF" line carrying its ID, then a
/// `letter-probability matrix:` header, then one row of A, C, G, T
/// probabilities per motif position.
///
/// # Arguments
/// * `filename` - Path to the MEME format file to read
///
/// # Returns
/// * `Result<PwmCollection>` - Motif IDs paired with their matrices, in file order
///
/// # Errors
/// * `SamplerError::Io` - If the file cannot be opened or read
/// * `SamplerError::InvalidFileFormat` - If no PWMs are found
/// * `SamplerError::InvalidPwm` - If a motif has no matrix rows
pub fn read_meme(filename: &str) -> Result<PwmCollection> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines().peekable();
    let mut pwms = Vec::new();

    // Skip header until first MOTIF
    skip_until_motif(&mut lines);

    while let Some((id, pwm)) = parse_pwm(&mut lines)? {
        pwms.push((id, pwm));
        skip_until_motif(&mut lines);
    }

    if pwms.is_empty() {
        return Err(SamplerError::InvalidFileFormat("No PWMs found".into()));
    }

    Ok(pwms)
}

/// Adds a pseudocount to every entry and renormalizes each row to sum to 1
pub fn with_pseudocount(pwm: &Pwm) -> Pwm {
    let mut out = pwm.mapv(|p| p.max(0.0) + PSEUDOCOUNT);
    for mut row in out.axis_iter_mut(Axis(0)) {
        let sum = row.sum();
        row.mapv_inplace(|p| p / sum);
    }
    out
}

/// Likelihood-ratio scoring of sequence windows against a set of PWMs.
#[derive(Debug, Clone)]
pub struct PwmModel {
    sequences: Vec<Vec<Option<usize>>>,
    /// Reverse complements, empty unless both strands are scored
    reverse: Vec<Vec<Option<usize>>>,
    names: Vec<String>,
    log_odds: Vec<Array2<f64>>,
    width: usize,
    both_strands: bool,
}

impl PwmModel {
    /// Builds the model from parsed records and motifs.
    ///
    /// # Errors
    /// * `SamplerError::InvalidPwm` - no motifs, a matrix without 4 columns,
    ///   or motifs of differing widths
    pub fn new(
        records: &[FastaRecord],
        motifs: PwmCollection,
        background: [f64; 4],
        both_strands: bool,
    ) -> Result<Self> {
        let width = match motifs.first() {
            Some((_, pwm)) => pwm.nrows(),
            None => return Err(SamplerError::invalid_pwm("No motifs supplied")),
        };
        if width == 0 {
            return Err(SamplerError::invalid_pwm("Motif width must be positive"));
        }

        let mut names = Vec::with_capacity(motifs.len());
        let mut log_odds = Vec::with_capacity(motifs.len());
        for (name, pwm) in motifs {
            if pwm.ncols() != 4 {
                return Err(SamplerError::invalid_pwm(format!(
                    "{} has {} columns, expected 4",
                    name,
                    pwm.ncols()
                )));
            }
            if pwm.nrows() != width {
                return Err(SamplerError::invalid_pwm(format!(
                    "{} has width {}, expected {}",
                    name,
                    pwm.nrows(),
                    width
                )));
            }
            let mut scores = with_pseudocount(&pwm);
            for mut row in scores.axis_iter_mut(Axis(0)) {
                for (b, p) in row.iter_mut().enumerate() {
                    *p = (*p / background[b]).ln();
                }
            }
            names.push(name);
            log_odds.push(scores);
        }

        let sequences = records.iter().map(|r| encode(&r.sequence)).collect();
        let reverse = if both_strands {
            records.iter().map(|r| encode(&rev_comp(&r.sequence))).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            sequences,
            reverse,
            names,
            log_odds,
            width,
            both_strands,
        })
    }

    pub fn motif_names(&self) -> &[String] {
        &self.names
    }

    pub fn sequence_lengths(&self) -> Vec<usize> {
        self.sequences.iter().map(Vec::len).collect()
    }

    fn window_ratio(scores: &Array2<f64>, window: &[Option<usize>]) -> f64 {
        let mut total = 0.0;
        for (j, base) in window.iter().enumerate() {
            match base {
                Some(b) => total += scores[[j, *b]],
                None => return 0.0,
            }
        }
        total.exp()
    }
}

fn encode(sequence: &str) -> Vec<Option<usize>> {
    sequence.chars().map(|c| BASE_INDEX.get(&c).copied()).collect()
}

impl SequenceModel for PwmModel {
    fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    fn sequence_len(&self, seq: usize) -> usize {
        self.sequences[seq].len()
    }

    fn motif_width(&self) -> usize {
        self.width
    }

    fn num_motifs(&self) -> usize {
        self.log_odds.len()
    }

    fn compute_profile(&self, seq: usize, motif: usize) -> Vec<f64> {
        let scores = &self.log_odds[motif];
        let forward = &self.sequences[seq];
        let len = forward.len();
        forward
            .windows(self.width)
            .enumerate()
            .map(|(p, window)| {
                let mut ratio = Self::window_ratio(scores, window);
                if self.both_strands {
                    // window p on the forward strand ends at len - p on the reverse one
                    let rc = &self.reverse[seq][len - p - self.width..len - p];
                    ratio += Self::window_ratio(scores, rc);
                }
                ratio
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn record(sequence: &str) -> FastaRecord {
        FastaRecord {
            label: "s".into(),
            sequence: sequence.into(),
        }
    }

    #[test]
    fn test_pseudocount_rows_sum_to_one() {
        let pwm = array![[1.0, 0.0, 0.0, 0.0], [0.25, 0.25, 0.25, 0.25]];
        let adjusted = with_pseudocount(&pwm);
        for row in adjusted.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        assert!(adjusted[[0, 1]] > 0.0);
    }

    #[test]
    fn test_profile_peaks_on_consensus() {
        let pwm = array![
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0]
        ];
        let model = PwmModel::new(
            &[record("TTACGTT")],
            vec![("acg".into(), pwm)],
            [0.25; 4],
            false,
        )
        .unwrap();
        let profile = model.compute_profile(0, 0);
        assert_eq!(profile.len(), 5);
        let best = profile
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap()
            .0;
        assert_eq!(best, 2);
    }

    #[test]
    fn test_reverse_strand_site_found_with_both_strands() {
        let pwm = array![
            [1.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0]
        ];
        // GTT is the reverse complement of AAC
        let records = [record("CCGTTCC")];
        let single = PwmModel::new(&records, vec![("aac".into(), pwm.clone())], [0.25; 4], false)
            .unwrap()
            .compute_profile(0, 0);
        let both = PwmModel::new(&records, vec![("aac".into(), pwm)], [0.25; 4], true)
            .unwrap()
            .compute_profile(0, 0);

        assert!(single.iter().all(|&r| r < 1.0));
        let best = both
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap()
            .0;
        assert_eq!(best, 2);
        assert!(both[2] > 1.0);
    }

    #[test]
    fn test_unknown_bases_score_zero() {
        let pwm = array![[0.25, 0.25, 0.25, 0.25], [0.25, 0.25, 0.25, 0.25]];
        let model =
            PwmModel::new(&[record("ANA")], vec![("flat".into(), pwm)], [0.25; 4], true).unwrap();
        assert_eq!(model.compute_profile(0, 0), vec![0.0, 0.0]);
    }

    #[test]
    fn test_mixed_widths_rejected() {
        let a = Array2::from_elem((3, 4), 0.25);
        let b = Array2::from_elem((4, 4), 0.25);
        let result = PwmModel::new(
            &[record("ACGT")],
            vec![("a".into(), a), ("b".into(), b)],
            [0.25; 4],
            false,
        );
        assert!(result.is_err());
    }
}
