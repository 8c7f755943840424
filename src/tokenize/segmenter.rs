use std::sync::Arc;

use crate::vocab::Vocabulary;

use super::error::TokenizeError;

/// Splits raw text into word tokens.
///
/// Must match the segmentation used when the vocabulary was built; a mismatch
/// does not fail, it only turns more words into the unknown id.
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Result<Vec<String>, TokenizeError>;

    fn name(&self) -> &'static str;
}

/// Forward maximum matching against the vocabulary.
///
/// At each position the longest vocabulary word is taken. Text with no vocabulary
/// match falls back to a run of ASCII alphanumerics or a single character.
#[derive(Debug, Clone)]
pub struct MaxMatchSegmenter {
    vocab: Arc<Vocabulary>,
}

impl MaxMatchSegmenter {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    fn longest_match(&self, chars: &[char], start: usize) -> Option<usize> {
        let window = self.vocab.max_word_chars().min(chars.len() - start);
        let mut candidate = String::with_capacity(window * 4);
        let mut best = None;
        for (offset, &c) in chars[start..start + window].iter().enumerate() {
            if c.is_whitespace() {
                break;
            }
            candidate.push(c);
            if self.vocab.contains(&candidate) {
                best = Some(offset + 1);
            }
        }
        best
    }
}

impl Segmenter for MaxMatchSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < chars.len() {
            if chars[pos].is_whitespace() {
                pos += 1;
                continue;
            }

            let len = match self.longest_match(&chars, pos) {
                Some(len) => len,
                None if chars[pos].is_ascii_alphanumeric() => chars[pos..]
                    .iter()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .count(),
                None => 1,
            };

            tokens.push(chars[pos..pos + len].iter().collect());
            pos += len;
        }

        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "max-match"
    }
}
