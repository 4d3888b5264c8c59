//! Stop-word removal for spoken commands

use std::collections::HashSet;

/// Strips assistant-name and filler tokens from an utterance, leaving the
/// semantic payload (a contact name, an application, a search term).
#[derive(Debug, Clone, Default)]
pub struct CommandNormalizer {
    stop_words: HashSet<String>,
}

impl CommandNormalizer {
    /// Create a normalizer from any list of stop words. Matching is
    /// case-insensitive and token based.
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words = stop_words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { stop_words }
    }

    /// Remove every stop word, collapse whitespace and keep the remaining
    /// tokens in their original order.
    pub fn normalize(&self, raw: &str) -> String {
        raw.split_whitespace()
            .map(str::to_lowercase)
            .filter(|token| !self.stop_words.contains(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(&token.to_lowercase())
    }

    pub fn stop_words(&self) -> impl Iterator<Item = &str> {
        self.stop_words.iter().map(String::as_str)
    }
}
