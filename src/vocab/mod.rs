//! Word → id vocabulary.
//!
//! Id `0` is reserved for padding and unknown words. A [`Vocabulary`] is built once
//! (from a JSON dictionary or a word list) and is read-only afterwards.

pub mod error;


pub use error::VocabError;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info};

use crate::constants::PAD_ID;

/// Result of a vocabulary lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenId {
    /// Word present in the vocabulary.
    Known(u32),
    /// Word missing from the vocabulary; encodes as [`PAD_ID`].
    Unknown,
}

impl TokenId {
    /// Returns the integer id fed to the model.
    pub fn id(self) -> u32 {
        match self {
            TokenId::Known(id) => id,
            TokenId::Unknown => PAD_ID,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, TokenId::Known(_))
    }
}

/// Immutable word → id mapping.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    ids: HashMap<String, u32>,
    max_id: u32,
    max_word_chars: usize,
}

impl Vocabulary {
    /// Builds a vocabulary from explicit `(word, id)` pairs.
    ///
    /// Fails if any word maps to the reserved padding id.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, VocabError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut vocab = Self::default();
        for (word, id) in pairs {
            let word = word.into();
            if id == PAD_ID {
                return Err(VocabError::ReservedId { word });
            }
            vocab.insert(word, id);
        }
        Ok(vocab)
    }

    /// Assigns ids from 1 in iteration order. Blank entries are skipped and
    /// duplicates keep their first id.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::default();
        let mut next_id = PAD_ID + 1;
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() || vocab.ids.contains_key(word) {
                continue;
            }
            vocab.insert(word.to_string(), next_id);
            next_id += 1;
        }
        vocab
    }

    /// Loads a JSON object of `word: id` pairs.
    pub fn load_json(path: &Path) -> Result<Self, VocabError> {
        if !path.exists() {
            return Err(VocabError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let reader = BufReader::new(File::open(path)?);
        let raw: HashMap<String, u32> =
            serde_json::from_reader(reader).map_err(|e| VocabError::ParseFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let vocab = Self::from_pairs(raw)?;
        if vocab.is_empty() {
            return Err(VocabError::Empty);
        }

        info!(
            path = %path.display(),
            words = vocab.len(),
            max_id = vocab.max_id,
            "Vocabulary loaded"
        );
        Ok(vocab)
    }

    /// Reads a word list (one word per line) and assigns ids in file order.
    pub fn load_word_list(path: &Path) -> Result<Self, VocabError> {
        if !path.exists() {
            return Err(VocabError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let reader = BufReader::new(File::open(path)?);
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        let vocab = Self::from_words(&lines);

        debug!(path = %path.display(), words = vocab.len(), "Word list read");
        Ok(vocab)
    }

    /// Writes the vocabulary as a JSON object ordered by id.
    pub fn write_json(&self, path: &Path) -> Result<(), VocabError> {
        let file = File::create(path).map_err(|e| VocabError::WriteFailed {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| VocabError::WriteFailed {
            reason: e.to_string(),
        })?;
        writer.write_all(b"\n").map_err(|e| VocabError::WriteFailed {
            reason: e.to_string(),
        })?;
        writer.flush().map_err(|e| VocabError::WriteFailed {
            reason: e.to_string(),
        })
    }

    pub fn lookup(&self, word: &str) -> TokenId {
        match self.ids.get(word) {
            Some(&id) => TokenId::Known(id),
            None => TokenId::Unknown,
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.ids.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Largest id in use.
    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    /// Embedding rows required to index every id, padding row included.
    pub fn embedding_rows(&self) -> usize {
        self.max_id as usize + 1
    }

    /// Length in chars of the longest word; bounds the max-match window.
    pub fn max_word_chars(&self) -> usize {
        self.max_word_chars
    }

    /// Entries sorted by id (ties broken by word).
    pub fn entries_by_id(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> =
            self.ids.iter().map(|(w, &id)| (w.as_str(), id)).collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    fn insert(&mut self, word: String, id: u32) {
        self.max_id = self.max_id.max(id);
        self.max_word_chars = self.max_word_chars.max(word.chars().count());
        self.ids.insert(word, id);
    }
}

impl Serialize for Vocabulary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries_by_id();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (word, id) in entries {
            map.serialize_entry(word, &id)?;
        }
        map.end()
    }
}
