//! Labelled sentence pairs stored as three parallel files.
//!
//! ```text
//! addr1_tokenized.txt   1 2 3        (one id line per pair, space separated)
//! addr2_tokenized.txt   1 2 3 4
//! labels.txt            1
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use super::error::EvalError;
use crate::tokenize::{EncodedSequence, Indexer};

pub const FIRST_FILE: &str = "addr1_tokenized.txt";
pub const SECOND_FILE: &str = "addr2_tokenized.txt";
pub const LABELS_FILE: &str = "labels.txt";

#[derive(Debug, Clone, PartialEq)]
pub struct PairExample {
    pub first: EncodedSequence,
    pub second: EncodedSequence,
    pub label: f32,
}

impl PairExample {
    pub fn is_positive(&self) -> bool {
        self.label >= 0.5
    }
}

#[derive(Debug, Clone, Default)]
pub struct PairDataset {
    examples: Vec<PairExample>,
}

impl PairDataset {
    pub fn new(examples: Vec<PairExample>) -> Self {
        Self { examples }
    }

    /// Loads the three parallel files, padding or truncating each id line to `max_len`.
    pub fn load(
        first: &Path,
        second: &Path,
        labels: &Path,
        max_len: usize,
    ) -> Result<Self, EvalError> {
        let first_ids = read_id_lines(first, max_len)?;
        let second_ids = read_id_lines(second, max_len)?;
        let labels = read_labels(labels)?;

        if first_ids.len() != second_ids.len() || first_ids.len() != labels.len() {
            return Err(EvalError::LengthMismatch {
                first: first_ids.len(),
                second: second_ids.len(),
                labels: labels.len(),
            });
        }

        let examples: Vec<PairExample> = first_ids
            .into_iter()
            .zip(second_ids)
            .zip(labels)
            .map(|((first, second), label)| PairExample {
                first,
                second,
                label,
            })
            .collect();

        info!(pairs = examples.len(), max_len, "Pair dataset loaded");
        Ok(Self { examples })
    }

    /// Loads `addr1_tokenized.txt`, `addr2_tokenized.txt` and `labels.txt` from `dir`.
    pub fn load_dir(dir: &Path, max_len: usize) -> Result<Self, EvalError> {
        Self::load(
            &dir.join(FIRST_FILE),
            &dir.join(SECOND_FILE),
            &dir.join(LABELS_FILE),
            max_len,
        )
    }

    pub fn examples(&self) -> &[PairExample] {
        &self.examples
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairExample> {
        self.examples.iter()
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.examples.iter().filter(|e| e.is_positive()).count()
    }
}

/// Counts from [`tokenize_dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeSummary {
    pub pairs: usize,
    pub skipped: usize,
}

/// Converts an `addr1 \t addr2 \t label` file into the three parallel id files
/// under `output_dir`.
///
/// Rows without exactly three columns are skipped. Ids are written unpadded; unknown
/// words become `0` and the vocabulary is left untouched.
pub fn tokenize_dataset(
    input: &Path,
    output_dir: &Path,
    indexer: &Indexer,
) -> Result<TokenizeSummary, EvalError> {
    if !input.exists() {
        return Err(EvalError::NotFound {
            path: input.to_path_buf(),
        });
    }
    std::fs::create_dir_all(output_dir).map_err(write_failed)?;

    let reader = BufReader::new(File::open(input)?);
    let mut first_out = create(&output_dir.join(FIRST_FILE))?;
    let mut second_out = create(&output_dir.join(SECOND_FILE))?;
    let mut labels_out = create(&output_dir.join(LABELS_FILE))?;

    let mut summary = TokenizeSummary {
        pairs: 0,
        skipped: 0,
    };

    for line in reader.lines() {
        let line = line?;
        let columns: Vec<&str> = line.trim().split('\t').collect();
        let [first, second, label] = columns.as_slice() else {
            summary.skipped += 1;
            continue;
        };

        writeln!(first_out, "{}", join_ids(&indexer.word_ids(first)?)).map_err(write_failed)?;
        writeln!(second_out, "{}", join_ids(&indexer.word_ids(second)?)).map_err(write_failed)?;
        writeln!(labels_out, "{}", label.trim()).map_err(write_failed)?;
        summary.pairs += 1;
    }

    for out in [&mut first_out, &mut second_out, &mut labels_out] {
        out.flush().map_err(write_failed)?;
    }

    if summary.skipped > 0 {
        warn!(skipped = summary.skipped, "Skipped rows without three columns");
    }
    info!(
        input = %input.display(),
        output = %output_dir.display(),
        pairs = summary.pairs,
        "Dataset tokenized"
    );
    Ok(summary)
}

fn read_id_lines(path: &Path, max_len: usize) -> Result<Vec<EncodedSequence>, EvalError> {
    let mut sequences = Vec::new();
    for (index, line) in open_lines(path)?.enumerate() {
        let line = line?;
        let ids = line
            .split_whitespace()
            .map(|tok| tok.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| malformed(path, index, e))?;
        sequences.push(EncodedSequence::from_ids(ids, max_len));
    }
    debug!(path = %path.display(), lines = sequences.len(), "Id file read");
    Ok(sequences)
}

fn read_labels(path: &Path) -> Result<Vec<f32>, EvalError> {
    let mut labels = Vec::new();
    for (index, line) in open_lines(path)?.enumerate() {
        let line = line?;
        let label = line
            .trim()
            .parse::<f32>()
            .map_err(|e| malformed(path, index, e))?;
        labels.push(label);
    }
    Ok(labels)
}

fn open_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>, EvalError> {
    if !path.exists() {
        return Err(EvalError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(BufReader::new(File::open(path)?).lines())
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn create(path: &Path) -> Result<BufWriter<File>, EvalError> {
    File::create(path).map(BufWriter::new).map_err(|e| EvalError::WriteFailed {
        reason: format!("{}: {}", path.display(), e),
    })
}

fn write_failed(err: std::io::Error) -> EvalError {
    EvalError::WriteFailed {
        reason: err.to_string(),
    }
}

fn malformed(path: &Path, index: usize, err: impl std::fmt::Display) -> EvalError {
    EvalError::Malformed {
        path: path.to_path_buf(),
        line: index + 1,
        reason: err.to_string(),
    }
}

