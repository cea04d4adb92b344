//! Word-level vocabulary: text to token ids and back.

pub mod seed;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ModelError;

pub const PAD_ID: usize = 0;
pub const UNK_ID: usize = 1;
pub const BOS_ID: usize = 2;
pub const EOS_ID: usize = 3;
pub const MASK_ID: usize = 4;

/// Special tokens in id order.
pub const SPECIAL_TOKENS: [&str; 5] = ["<PAD>", "<UNK>", "<BOS>", "<EOS>", "<MASK>"];

/// Rendered in place of ids with no token and of `<UNK>`.
pub const UNKNOWN_PLACEHOLDER: &str = "[?]";

const VOCABULARY_VERSION: u32 = 1;

/// Lowercase `text` and split it into words: maximal runs of alphanumeric
/// characters and underscores.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Summary numbers for a vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyStats {
    pub total_tokens: usize,
    pub special_tokens: usize,
    /// Mean character length of non-special tokens (0 when there are none).
    pub average_token_length: f64,
    pub longest_token: String,
}

#[derive(Serialize, Deserialize)]
struct VocabularyFile {
    version: u32,
    tokens: Vec<String>,
}

/// Bidirectional token/id map. Ids are dense: the `n`-th token added gets id `n`,
/// and the special tokens always occupy ids `0..5`.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: HashMap<String, usize>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::with_special_tokens()
    }
}

impl Vocabulary {
    /// Only the five special tokens.
    pub fn with_special_tokens() -> Self {
        let tokens: Vec<String> = SPECIAL_TOKENS.iter().map(|t| t.to_string()).collect();
        let ids = tokens
            .iter()
            .enumerate()
            .map(|(id, t)| (t.clone(), id))
            .collect();
        Self { tokens, ids }
    }

    /// Special tokens followed by the built-in word lists.
    pub fn seeded() -> Self {
        let mut vocab = Self::with_special_tokens();
        for word in seed::COMMON_WORDS
            .iter()
            .chain(seed::ADVANCED_WORDS)
            .chain(seed::TECHNICAL_TERMS)
            .chain(seed::DOMAIN_TERMS)
        {
            vocab.add_token(word);
        }
        for phrase in seed::PHRASES {
            vocab.add_phrase(phrase);
        }
        for word in seed::INTERNATIONAL_WORDS {
            vocab.add_token(word);
        }
        info!("Vocabulary initialized: {} tokens", vocab.len());
        vocab
    }

    /// Add a token (lowercased, trimmed). Returns its id, existing or new;
    /// `None` if the token is empty after trimming.
    pub fn add_token(&mut self, token: &str) -> Option<usize> {
        let clean = token.trim().to_lowercase();
        if clean.is_empty() {
            return None;
        }
        if let Some(&id) = self.ids.get(&clean) {
            return Some(id);
        }
        let id = self.tokens.len();
        self.ids.insert(clean.clone(), id);
        self.tokens.push(clean);
        Some(id)
    }

    /// Add each word of `phrase`, then the whole phrase joined by underscores.
    pub fn add_phrase(&mut self, phrase: &str) -> Option<usize> {
        let words = tokenize(phrase);
        for word in &words {
            self.add_token(word);
        }
        self.add_token(&words.join("_"))
    }

    /// Add every word; returns how many were new.
    pub fn expand<I, S>(&mut self, words: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.len();
        for word in words {
            self.add_token(word.as_ref());
        }
        let added = self.len() - before;
        info!("Added {} new tokens to vocabulary ({} total)", added, self.len());
        added
    }

    /// Word-tokenize `text`; unknown words map to `UNK_ID`. Never fails.
    pub fn encode(&self, text: &str) -> Vec<usize> {
        tokenize(text)
            .iter()
            .map(|w| self.ids.get(w).copied().unwrap_or(UNK_ID))
            .collect()
    }

    /// Join tokens with single spaces. PAD/BOS/EOS are dropped; `<UNK>` and
    /// ids with no token render as `[?]`.
    pub fn decode(&self, ids: &[usize]) -> String {
        let words: Vec<&str> = ids
            .iter()
            .filter(|&&id| !matches!(id, PAD_ID | BOS_ID | EOS_ID))
            .map(|&id| match self.tokens.get(id) {
                Some(_) if id == UNK_ID => UNKNOWN_PLACEHOLDER,
                Some(token) => token.as_str(),
                None => UNKNOWN_PLACEHOLDER,
            })
            .collect();
        words
            .iter()
            .flat_map(|w| w.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Id of `token` (case-insensitive), or `UNK_ID`.
    pub fn token_id(&self, token: &str) -> usize {
        self.ids
            .get(token)
            .or_else(|| self.ids.get(&token.to_lowercase()))
            .copied()
            .unwrap_or(UNK_ID)
    }

    pub fn token(&self, id: usize) -> Option<&str> {
        self.tokens.get(id).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.ids.contains_key(token) || self.ids.contains_key(&token.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn stats(&self) -> VocabularyStats {
        let words = &self.tokens[SPECIAL_TOKENS.len()..];
        let lengths: Vec<usize> = words.iter().map(|w| w.chars().count()).collect();
        let average_token_length = if lengths.is_empty() {
            0.0
        } else {
            lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
        };
        let mut longest_token = String::new();
        for (word, &len) in words.iter().zip(&lengths) {
            if len > longest_token.chars().count() {
                longest_token = word.clone();
            }
        }
        VocabularyStats {
            total_tokens: self.len(),
            special_tokens: SPECIAL_TOKENS.len(),
            average_token_length,
            longest_token,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let file = VocabularyFile {
            version: VOCABULARY_VERSION,
            tokens: self.tokens.clone(),
        };
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &file)?;
        writer.flush()?;
        info!("Vocabulary saved to {} ({} tokens)", path.display(), self.len());
        Ok(())
    }

    /// Load a vocabulary written by [`Vocabulary::save`]. The special tokens must
    /// be in place and no token may repeat.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let file: VocabularyFile = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        if file.version != VOCABULARY_VERSION {
            return Err(ModelError::InvalidVocabulary(format!(
                "unsupported version {}",
                file.version
            )));
        }
        let vocab = Self::from_tokens(file.tokens)?;
        info!("Vocabulary loaded from {} ({} tokens)", path.display(), vocab.len());
        Ok(vocab)
    }

    /// Build from tokens in id order.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self, ModelError> {
        for (id, special) in SPECIAL_TOKENS.iter().enumerate() {
            if tokens.get(id).map(String::as_str) != Some(*special) {
                return Err(ModelError::InvalidVocabulary(format!(
                    "expected {special} at id {id}"
                )));
            }
        }
        let mut ids = HashMap::with_capacity(tokens.len());
        for (id, token) in tokens.iter().enumerate() {
            if token.trim().is_empty() {
                return Err(ModelError::InvalidVocabulary(format!("empty token at id {id}")));
            }
            if ids.insert(token.clone(), id).is_some() {
                return Err(ModelError::InvalidVocabulary(format!(
                    "duplicate token {token:?}"
                )));
            }
        }
        Ok(Self { tokens, ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Vocabulary {
        let mut vocab = Vocabulary::with_special_tokens();
        for w in ["the", "cat", "sat"] {
            vocab.add_token(w);
        }
        vocab
    }

    #[test]
    fn scenario_encode_decode() {
        let vocab = small();
        assert_eq!(vocab.token_id("<EOS>"), EOS_ID);
        assert_eq!(vocab.encode("the cat sat"), vec![5, 6, 7]);
        assert_eq!(vocab.decode(&[5, 6, 7]), "the cat sat");
    }

    #[test]
    fn add_token_is_idempotent() {
        let mut vocab = small();
        assert_eq!(vocab.add_token("  The "), Some(5));
        assert_eq!(vocab.add_token("dog"), Some(8));
        assert_eq!(vocab.add_token("dog"), Some(8));
        assert_eq!(vocab.add_token("   "), None);
        assert_eq!(vocab.len(), 9);
    }

    #[test]
    fn unknown_words_encode_as_unk() {
        let vocab = small();
        assert_eq!(vocab.encode("The DOG sat!"), vec![5, UNK_ID, 7]);
        assert!(vocab.encode("").is_empty());
        assert!(vocab.encode("  ,.  ").is_empty());
    }

    #[test]
    fn decode_strips_markers_and_marks_unknowns() {
        let vocab = small();
        let ids = [BOS_ID, 5, PAD_ID, UNK_ID, 6, 999, EOS_ID];
        assert_eq!(vocab.decode(&ids), "the [?] cat [?]");
        assert_eq!(vocab.decode(&[PAD_ID, EOS_ID]), "");
    }

    #[test]
    fn added_tokens_decode_immediately() {
        let mut vocab = small();
        let id = vocab.add_token("mat").unwrap();
        assert_eq!(vocab.decode(&[id]), "mat");
    }

    #[test]
    fn phrases_add_words_and_joined_token() {
        let mut vocab = Vocabulary::with_special_tokens();
        let id = vocab.add_phrase("Machine Learning").unwrap();
        assert_eq!(vocab.token(id), Some("machine_learning"));
        assert!(vocab.contains("machine"));
        assert_eq!(vocab.encode("machine_learning"), vec![id]);
    }

    #[test]
    fn expand_counts_only_new_tokens() {
        let mut vocab = small();
        assert_eq!(vocab.expand(["cat", "dog", "bird", "dog"]), 2);
    }

    #[test]
    fn seeded_vocabulary_is_stable() {
        let a = Vocabulary::seeded();
        let b = Vocabulary::seeded();
        assert_eq!(a.len(), b.len());
        assert_eq!(a.token(5), Some("the"));
        assert_eq!(a.encode("the neural network"), b.encode("the neural network"));
        assert!(a.contains("in_other_words"));
        let stats = a.stats();
        assert_eq!(stats.special_tokens, 5);
        assert_eq!(stats.total_tokens, a.len());
        assert!(stats.average_token_length > 1.0);
    }

    #[test]
    fn stats_of_small_vocabulary() {
        let stats = small().stats();
        assert_eq!(stats.total_tokens, 8);
        assert!((stats.average_token_length - 3.0).abs() < 1e-12);
        assert_eq!(stats.longest_token, "the");
    }

    #[test]
    fn save_then_load() {
        let vocab = small();
        let path = std::env::temp_dir().join(format!("wordformer-vocab-{}.json", std::process::id()));
        vocab.save(&path).unwrap();
        let loaded = Vocabulary::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.len(), vocab.len());
        assert_eq!(loaded.encode("sat the cat"), vec![7, 5, 6]);
    }

    #[test]
    fn from_tokens_rejects_missing_specials_and_duplicates() {
        assert!(Vocabulary::from_tokens(vec!["the".into()]).is_err());
        let mut tokens: Vec<String> = SPECIAL_TOKENS.iter().map(|t| t.to_string()).collect();
        tokens.push("a".into());
        tokens.push("a".into());
        assert!(matches!(
            Vocabulary::from_tokens(tokens),
            Err(ModelError::InvalidVocabulary(_))
        ));
    }
}
