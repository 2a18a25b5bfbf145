use crate::config::FilterConfig;
use regex::{Regex, RegexBuilder};
use tracing::debug;

const PROFANITY: &[&str] = &[
    "damn", "hell", "shit", "fuck", "bitch", "ass", "bastard", "crap", "piss", "dick", "cock",
    "pussy", "whore", "slut",
];

const POLITICAL: &[&str] = &[
    "trump",
    "biden",
    "democrat",
    "republican",
    "liberal",
    "conservative",
    "election",
    "vote",
    "politics",
    "political",
    "government",
    "congress",
    "senate",
    "president",
    "politician",
    "campaign",
    "ballot",
    "policy",
    "immigration",
    "abortion",
    "gun control",
    "healthcare",
    "taxes",
    "climate change",
    "covid",
    "vaccine",
    "mask",
    "lockdown",
];

const NSFW: &[&str] = &[
    "sex",
    "sexual",
    "porn",
    "nude",
    "naked",
    "adult",
    "xxx",
    "erotic",
    "fetish",
    "kinky",
    "orgasm",
    "masturbate",
    "horny",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCategory {
    Profanity,
    Politics,
    Competitor,
    Nsfw,
}

#[derive(Debug)]
struct CategoryMatcher {
    category: FilterCategory,
    pattern: Option<Regex>,
}

/// Binary gate over scraped text. Each category compiles to one
/// case-insensitive `\b(?:w1|w2|..)\b` alternation.
#[derive(Debug)]
pub struct ContentFilter {
    matchers: Vec<CategoryMatcher>,
    profanity: Option<Regex>,
}

impl ContentFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let mut matchers = Vec::with_capacity(4);

        if config.profanity {
            matchers.push(CategoryMatcher {
                category: FilterCategory::Profanity,
                pattern: word_pattern(PROFANITY.iter().copied()),
            });
        }
        if config.politics {
            matchers.push(CategoryMatcher {
                category: FilterCategory::Politics,
                pattern: word_pattern(POLITICAL.iter().copied()),
            });
        }
        matchers.push(CategoryMatcher {
            category: FilterCategory::Competitor,
            pattern: word_pattern(config.competitors.iter().map(String::as_str)),
        });
        if config.nsfw {
            matchers.push(CategoryMatcher {
                category: FilterCategory::Nsfw,
                pattern: word_pattern(NSFW.iter().copied()),
            });
        }

        Self {
            matchers,
            profanity: word_pattern(PROFANITY.iter().copied()),
        }
    }

    /// Fails closed: empty text is never safe.
    pub fn is_safe(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        match self.violation(text) {
            Some(category) => {
                debug!("Filtered content ({:?})", category);
                false
            }
            None => true,
        }
    }

    /// First enabled category the text trips, if any.
    pub fn violation(&self, text: &str) -> Option<FilterCategory> {
        self.matchers
            .iter()
            .find(|m| m.pattern.as_ref().is_some_and(|re| re.is_match(text)))
            .map(|m| m.category)
    }

    /// Masks profanity with `*`, one per character, regardless of whether the
    /// profanity category is enabled for filtering.
    pub fn clean(&self, text: &str) -> String {
        match &self.profanity {
            Some(re) => re
                .replace_all(text, |caps: &regex::Captures| {
                    "*".repeat(caps[0].chars().count())
                })
                .into_owned(),
            None => text.to_string(),
        }
    }
}

fn word_pattern<'a>(words: impl Iterator<Item = &'a str>) -> Option<Regex> {
    let alternation = words
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    if alternation.is_empty() {
        return None;
    }
    RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
        .case_insensitive(true)
        .build()
        .ok()
}
