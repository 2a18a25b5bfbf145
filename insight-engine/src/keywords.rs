use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use xthreads_core::AnalysisConfig;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "this", "that", "these", "those", "i", "you", "he", "she", "it",
    "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our", "their",
    "just", "now", "then", "here", "there", "when", "where", "why", "how", "all", "any", "both",
    "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own",
    "same", "so", "than", "too", "very", "can", "may", "might", "must", "shall",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub term: String,
    pub count: usize,
}

/// Term counts that remember the order terms were first seen in.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    counts: HashMap<String, usize>,
    order: Vec<String>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: &str) {
        match self.counts.get_mut(term) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(term.to_string(), 1);
                self.order.push(term.to_string());
            }
        }
    }

    pub fn count(&self, term: &str) -> usize {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The `n` highest counts. Equal counts keep first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<KeywordCount> {
        let mut ranked: Vec<KeywordCount> = self
            .order
            .iter()
            .map(|term| KeywordCount {
                term: term.clone(),
                count: self.counts[term],
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(n);
        ranked
    }
}

#[derive(Debug, Clone)]
pub struct KeywordConfig {
    pub min_token_chars: usize,
    pub include_bigrams: bool,
    pub stop_words: BTreeSet<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            min_token_chars: 3,
            include_bigrams: true,
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl KeywordConfig {
    pub fn from_analysis(analysis: &AnalysisConfig) -> Self {
        Self {
            min_token_chars: analysis.min_token_chars,
            include_bigrams: analysis.include_bigrams,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordExtractor {
    config: KeywordConfig,
}

impl KeywordExtractor {
    pub fn new(config: KeywordConfig) -> Self {
        Self { config }
    }

    /// Lowercased, punctuation-free alphabetic tokens that are long enough
    /// and not stop words, in text order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        cleaned
            .split_whitespace()
            .filter(|token| token.chars().count() >= self.config.min_token_chars)
            .filter(|token| token.chars().all(char::is_alphabetic))
            .filter(|token| !self.config.stop_words.contains(*token))
            .map(str::to_string)
            .collect()
    }

    pub fn extract(&self, text: &str) -> KeywordTable {
        self.extract_all([text])
    }

    /// Treats the texts as one space-joined document: every unigram is
    /// counted first, then the adjacent bigrams of the whole token stream, so
    /// the last word of one text pairs with the first word of the next.
    pub fn extract_all<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> KeywordTable {
        let tokens: Vec<String> = texts.into_iter().flat_map(|t| self.tokenize(t)).collect();
        let mut table = KeywordTable::new();

        for token in &tokens {
            table.add(token);
        }

        if self.config.include_bigrams {
            for pair in tokens.windows(2) {
                table.add(&format!("{} {}", pair[0], pair[1]));
            }
        }

        table
    }
}
