use crate::error::{Result, SamplerError};
use crate::types::FastaRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Pseudocount added to each base when estimating background frequencies
const BACKGROUND_PSEUDOCOUNT: f64 = 1.0;

/// Reads sequences from a FASTA format file.
///
/// # Arguments
/// * `filename` - Path to the FASTA file to read
///
/// # Returns
/// * `Result<Vec<FastaRecord>>` - Records in file order, with:
///   - `label`: The sequence identifier (without '>' prefix)
///   - `sequence`: The concatenated sequence lines in uppercase
///
/// # Errors
/// * Returns `SamplerError::InvalidFileFormat` if no sequences are found
/// * Returns `SamplerError::Io` for file reading issues
pub fn read_fasta(filename: &str) -> Result<Vec<FastaRecord>> {
    let file = File::open(filename)?;
    parse_fasta(BufReader::new(file))
}

/// Parses FASTA records from any buffered reader.
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<FastaRecord>> {
    let mut records: Vec<FastaRecord> = Vec::new();
    let mut current_header: Option<String> = None;
    let mut current_sequence = String::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if let Some(header) = line.strip_prefix('>') {
            if let Some(label) = current_header.take() {
                records.push(FastaRecord {
                    label,
                    sequence: current_sequence.to_uppercase(),
                });
                current_sequence.clear();
            }
            current_header = Some(header.to_string());
        } else if !line.is_empty() {
            if current_header.is_none() {
                return Err(SamplerError::InvalidFileFormat(
                    "Sequence data before first header".into(),
                ));
            }
            current_sequence.push_str(line);
        }
    }

    if let Some(label) = current_header {
        records.push(FastaRecord {
            label,
            sequence: current_sequence.to_uppercase(),
        });
    }

    if records.is_empty() {
        return Err(SamplerError::InvalidFileFormat("No sequences found".into()));
    }

    Ok(records)
}

/// Generates the reverse complement of a DNA sequence.
///
/// # Arguments
/// * `sequence` - Input DNA sequence string
///
/// # Returns
/// * `String` - The reverse complement sequence where:
///   - A ↔ T
///   - C ↔ G
///   - anything else becomes N
pub fn rev_comp(sequence: &str) -> String {
    let compliment = HashMap::from([('A', 'T'), ('T', 'A'), ('C', 'G'), ('G', 'C')]);
    sequence
        .chars()
        .rev()
        .map(|c| compliment.get(&c).copied().unwrap_or('N'))
        .collect()
}

/// Estimates A, C, G, T background frequencies over all records.
///
/// Each base starts from a pseudocount so the result never contains zero;
/// characters outside ACGT are ignored.
pub fn base_frequencies(records: &[FastaRecord]) -> [f64; 4] {
    let mut counts = [BACKGROUND_PSEUDOCOUNT; 4];
    for record in records {
        for c in record.sequence.chars() {
            if let Some(&i) = crate::pwm::BASE_INDEX.get(&c) {
                counts[i] += 1.0;
            }
        }
    }
    let total: f64 = counts.iter().sum();
    counts.map(|c| c / total)
}
