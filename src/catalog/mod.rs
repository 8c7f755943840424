//! Candidate address catalog.
//!
//! One address per line, UTF-8. Blank lines are not candidates and repeated
//! addresses keep their first position; position is the tie-break priority.

pub mod error;


pub use error::CatalogError;

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

/// Ordered, de-duplicated candidate addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<String>,
    skipped_lines: usize,
}

impl Catalog {
    /// Builds a catalog from lines, trimming each and dropping blanks and repeats.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        let mut seen = HashSet::new();
        for line in lines {
            catalog.push_line(line.as_ref(), &mut seen);
        }
        catalog
    }

    /// Reads a catalog file.
    ///
    /// Lines that are not valid UTF-8 are skipped with a warning instead of
    /// failing the whole load.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let mut reader = BufReader::new(File::open(path)?);
        let mut catalog = Self::default();
        let mut seen = HashSet::new();
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            match std::str::from_utf8(&buf) {
                Ok(line) => catalog.push_line(line, &mut seen),
                Err(e) => {
                    warn!(line = line_no, error = %e, "Skipping malformed catalog line");
                    catalog.skipped_lines += 1;
                }
            }
        }

        info!(
            path = %path.display(),
            candidates = catalog.len(),
            skipped = catalog.skipped_lines,
            "Catalog loaded"
        );
        Ok(catalog)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.entries.get(position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines dropped because they were not valid UTF-8.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    fn push_line(&mut self, line: &str, seen: &mut HashSet<String>) {
        let address = line.trim();
        if address.is_empty() || !seen.insert(address.to_string()) {
            return;
        }
        self.entries.push(address.to_string());
    }
}

/// Collects the unique second-column addresses of a labelled pair file
/// (`addr1 \t addr2 \t label`) and writes them sorted, one per line.
///
/// Rows without exactly three columns are ignored. Returns the number written.
pub fn extract_unique_addresses(input: &Path, output: &Path) -> Result<usize, CatalogError> {
    if !input.exists() {
        return Err(CatalogError::NotFound {
            path: input.to_path_buf(),
        });
    }

    let reader = BufReader::new(File::open(input)?);
    let mut unique = BTreeSet::new();
    let mut malformed = 0usize;

    for line in reader.lines() {
        let line = line?;
        let columns: Vec<&str> = line.trim().split('\t').collect();
        match columns.as_slice() {
            [_, address, _] if !address.trim().is_empty() => {
                unique.insert(address.trim().to_string());
            }
            _ => malformed += 1,
        }
    }

    if malformed > 0 {
        warn!(malformed, "Skipped rows without three columns");
    }

    let file = File::create(output).map_err(|e| CatalogError::WriteFailed {
        reason: format!("{}: {}", output.display(), e),
    })?;
    let mut writer = BufWriter::new(file);
    for address in &unique {
        writeln!(writer, "{address}").map_err(|e| CatalogError::WriteFailed {
            reason: e.to_string(),
        })?;
    }
    writer.flush().map_err(|e| CatalogError::WriteFailed {
        reason: e.to_string(),
    })?;

    info!(
        input = %input.display(),
        output = %output.display(),
        addresses = unique.len(),
        "Extracted unique addresses"
    );
    Ok(unique.len())
}
