use crate::keywords::{KeywordConfig, KeywordCount, KeywordExtractor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};
use xthreads_core::{
    AnalysisConfig, EngagementFormula, FileConfig, PlatformConfig, PlatformPosts, RawPost,
};

const SAMPLE_CHARS: usize = 100;

/// Phrases that make a trending term relevant to the product.
const PRODUCT_PHRASES: &[&str] = &[
    "content creation",
    "twitter growth",
    "social media",
    "writing tools",
    "productivity",
    "automation",
    "ai writing",
    "content strategy",
];

const FALLBACK_FOCUS: &[&str] = &["content creation", "productivity", "AI tools"];

const FORMAT_SUGGESTIONS: &[&str] = &[
    "Use question-based hooks for higher engagement",
    "Consider thread format for complex topics",
    "Keep posts concise but informative",
];

const HOOK_OPENERS: &[&str] = &["What", "How", "Why", "When", "Where"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthStats {
    pub avg: f64,
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformInsight {
    pub platform: String,
    pub total_posts: usize,
    pub avg_engagement: f64,
    pub top_keywords: Vec<KeywordCount>,
    pub high_performers: Vec<RawPost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length_stats: Option<LengthStats>,
}

/// Traits shared by posts that beat the engagement threshold. Variants are
/// declared alphabetically so a sorted set serializes in name order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementIndicator {
    Educational,
    MultiLine,
    Question,
    Thread,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementPatterns {
    pub high_engagement_indicators: BTreeSet<EngagementIndicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSample {
    pub platform: String,
    pub content: String,
    pub engagement: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFormats {
    pub hooks: Vec<FormatSample>,
    pub threads: Vec<FormatSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub content_ideas: Vec<String>,
    pub format_suggestions: Vec<String>,
    pub keyword_focus: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub generated_at: DateTime<Utc>,
    pub platform_insights: BTreeMap<String, PlatformInsight>,
    pub keyword_trends: Vec<KeywordCount>,
    pub engagement_patterns: EngagementPatterns,
    pub content_formats: ContentFormats,
    pub recommendations: Recommendations,
}

impl Reflection {
    pub fn trending_terms(&self) -> impl Iterator<Item = &str> {
        self.keyword_trends.iter().map(|k| k.term.as_str())
    }
}

pub struct Reflector {
    analysis: AnalysisConfig,
    platforms: BTreeMap<String, PlatformConfig>,
    extractor: KeywordExtractor,
}

impl Reflector {
    pub fn new(analysis: AnalysisConfig, platforms: BTreeMap<String, PlatformConfig>) -> Self {
        let extractor = KeywordExtractor::new(KeywordConfig::from_analysis(&analysis));
        Self {
            analysis,
            platforms,
            extractor,
        }
    }

    pub fn from_config(config: &FileConfig) -> Self {
        Self::new(config.analysis.clone(), config.platforms.clone())
    }

    fn formula(&self, platform: &str) -> EngagementFormula {
        match self.platforms.get(platform) {
            Some(config) => config.engagement_formula(platform),
            None => PlatformConfig::default().engagement_formula(platform),
        }
    }

    fn engagement(&self, post: &RawPost) -> i64 {
        self.formula(&post.platform).score(&post.engagement)
    }

    pub fn reflect(&self, posts: &PlatformPosts<RawPost>) -> Reflection {
        info!("Analyzing content patterns...");

        let platform_insights: BTreeMap<String, PlatformInsight> = posts
            .iter()
            .filter(|(_, platform_posts)| !platform_posts.is_empty())
            .map(|(platform, platform_posts)| {
                (
                    platform.clone(),
                    self.analyze_platform(platform, platform_posts),
                )
            })
            .collect();

        let texts: Vec<String> = posts.values().flatten().map(keyword_text).collect();
        let keyword_trends = self
            .extractor
            .extract_all(texts.iter().map(String::as_str))
            .most_common(self.analysis.trending_limit);

        let engagement_patterns = self.engagement_patterns(posts);
        let content_formats = self.content_formats(posts);
        let recommendations = recommend(&platform_insights, &keyword_trends);

        info!(
            "Reflection complete: {} platforms, {} trending keywords",
            platform_insights.len(),
            keyword_trends.len()
        );

        Reflection {
            generated_at: Utc::now(),
            platform_insights,
            keyword_trends,
            engagement_patterns,
            content_formats,
            recommendations,
        }
    }

    pub fn analyze_platform(&self, platform: &str, posts: &[RawPost]) -> PlatformInsight {
        let formula = self.formula(platform);
        let scores: Vec<i64> = posts.iter().map(|p| formula.score(&p.engagement)).collect();
        let avg_engagement = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<i64>() as f64 / scores.len() as f64
        };

        let mut ranked: Vec<&RawPost> = posts.iter().collect();
        ranked.sort_by(|a, b| formula.score(&b.engagement).cmp(&formula.score(&a.engagement)));
        let keep = self.high_performer_count(posts.len());
        let high_performers: Vec<RawPost> = ranked.into_iter().take(keep).cloned().collect();

        let texts: Vec<String> = high_performers.iter().map(keyword_text).collect();
        let top_keywords = self
            .extractor
            .extract_all(texts.iter().map(String::as_str))
            .most_common(self.analysis.top_keywords_per_platform);

        debug!(
            "{}: {} posts, avg engagement {:.1}, {} high performers",
            platform,
            posts.len(),
            avg_engagement,
            high_performers.len()
        );

        PlatformInsight {
            platform: platform.to_string(),
            total_posts: posts.len(),
            avg_engagement,
            top_keywords,
            high_performers,
            content_length_stats: length_stats(posts),
        }
    }

    /// `max(minimum, ceil(fraction * n))`, capped at `n`.
    pub fn high_performer_count(&self, n: usize) -> usize {
        let by_fraction = (self.analysis.high_performer_fraction * n as f64).ceil() as usize;
        by_fraction.max(self.analysis.min_high_performers).min(n)
    }

    pub fn engagement_patterns(&self, posts: &PlatformPosts<RawPost>) -> EngagementPatterns {
        let mut indicators = BTreeSet::new();
        for post in posts.values().flatten() {
            if self.engagement(post) <= self.analysis.high_engagement_threshold {
                continue;
            }
            let text = post.full_text().to_lowercase();
            if text.contains('?') {
                indicators.insert(EngagementIndicator::Question);
            }
            if ["tip", "tips", "how to"].iter().any(|w| text.contains(w)) {
                indicators.insert(EngagementIndicator::Educational);
            }
            if is_thread(&text) {
                indicators.insert(EngagementIndicator::Thread);
            }
            if text.matches('\n').count() > 2 {
                indicators.insert(EngagementIndicator::MultiLine);
            }
        }
        EngagementPatterns {
            high_engagement_indicators: indicators,
        }
    }

    pub fn content_formats(&self, posts: &PlatformPosts<RawPost>) -> ContentFormats {
        let mut formats = ContentFormats::default();
        for post in posts.values().flatten() {
            let text = post.full_text();
            if text.is_empty() {
                continue;
            }
            let sample = FormatSample {
                platform: post.platform.clone(),
                content: truncate_sample(&text),
                engagement: self.engagement(post),
            };
            if HOOK_OPENERS.iter().any(|opener| text.starts_with(opener)) {
                formats.hooks.push(sample);
            } else if is_thread(&text.to_lowercase()) {
                formats.threads.push(sample);
            }
        }
        formats
    }
}

fn recommend(
    insights: &BTreeMap<String, PlatformInsight>,
    trends: &[KeywordCount],
) -> Recommendations {
    let content_ideas = trends
        .iter()
        .take(5)
        .map(|k| format!("Create content around '{}' (trending)", k.term))
        .collect();

    let format_suggestions = if insights.values().any(|i| !i.high_performers.is_empty()) {
        FORMAT_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    };

    let relevant: Vec<String> = trends
        .iter()
        .filter(|k| {
            let term = k.term.to_lowercase();
            PRODUCT_PHRASES.iter().any(|phrase| term.contains(phrase))
        })
        .take(3)
        .map(|k| k.term.clone())
        .collect();
    let keyword_focus = if relevant.is_empty() {
        FALLBACK_FOCUS.iter().map(|s| s.to_string()).collect()
    } else {
        relevant
    };

    Recommendations {
        content_ideas,
        format_suggestions,
        keyword_focus,
    }
}

fn keyword_text(post: &RawPost) -> String {
    match &post.title {
        Some(title) => format!("{} {}", post.text, title),
        None => post.text.clone(),
    }
}

fn is_thread(lowercase_text: &str) -> bool {
    lowercase_text.contains("thread") || lowercase_text.contains('🧵') || lowercase_text.contains("1/")
}

fn truncate_sample(text: &str) -> String {
    if text.chars().count() > SAMPLE_CHARS {
        let head: String = text.chars().take(SAMPLE_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn length_stats(posts: &[RawPost]) -> Option<LengthStats> {
    let lengths: Vec<usize> = posts
        .iter()
        .filter(|p| !p.text.is_empty())
        .map(|p| p.text.chars().count())
        .collect();
    let min = *lengths.iter().min()?;
    let max = *lengths.iter().max()?;
    Some(LengthStats {
        avg: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xthreads_core::Engagement;

    fn tweet(id: &str, text: &str, likes: u64, retweets: u64) -> RawPost {
        RawPost {
            id: id.to_string(),
            platform: "twitter".to_string(),
            text: text.to_string(),
            title: None,
            author: "maker".to_string(),
            engagement: Engagement {
                likes,
                retweets,
                ..Engagement::default()
            },
            created_at: Utc::now(),
            url: None,
            source: None,
        }
    }

    fn reddit(id: &str, title: &str, score: i64) -> RawPost {
        RawPost {
            id: id.to_string(),
            platform: "reddit".to_string(),
            text: String::new(),
            title: Some(title.to_string()),
            author: "redditor".to_string(),
            engagement: Engagement {
                score,
                ..Engagement::default()
            },
            created_at: Utc::now(),
            url: None,
            source: Some("SideProject".to_string()),
        }
    }

    fn reflector() -> Reflector {
        Reflector::from_config(&FileConfig::default())
    }

    #[test]
    fn test_twitter_high_performer_scenario() {
        let posts = vec![
            tweet("low", "quiet morning notes", 10, 0),
            tweet("high", "How I write viral threads every week", 150, 50),
        ];
        let insight = reflector().analyze_platform("twitter", &posts);

        assert_eq!(insight.total_posts, 2);
        assert_eq!(insight.avg_engagement, 105.0);
        assert_eq!(insight.high_performers.len(), 1);
        assert_eq!(insight.high_performers[0].id, "high");
        assert!(insight.top_keywords.iter().any(|k| k.term == "viral threads"));
    }

    #[test]
    fn test_high_performer_count_bounds() {
        let reflector = reflector();
        assert_eq!(reflector.high_performer_count(0), 0);
        assert_eq!(reflector.high_performer_count(1), 1);
        assert_eq!(reflector.high_performer_count(5), 1);
        assert_eq!(reflector.high_performer_count(6), 2);
        assert_eq!(reflector.high_performer_count(10), 2);
    }

    #[test]
    fn test_reddit_uses_score() {
        let posts = vec![
            reddit("a", "Automation saved my content calendar", 40),
            reddit("b", "Weekly feedback thread", 2),
        ];
        let insight = reflector().analyze_platform("reddit", &posts);
        assert_eq!(insight.avg_engagement, 21.0);
        assert_eq!(insight.high_performers[0].id, "a");
        assert_eq!(insight.content_length_stats, None);
    }

    #[test]
    fn test_length_stats() {
        let posts = vec![tweet("1", "abcd", 0, 0), tweet("2", "ab", 0, 0), tweet("3", "", 0, 0)];
        let stats = reflector()
            .analyze_platform("twitter", &posts)
            .content_length_stats
            .unwrap();
        assert_eq!(stats, LengthStats { avg: 3.0, min: 2, max: 4 });
    }

    #[test]
    fn test_engagement_patterns_are_sorted_and_deduplicated() {
        let mut posts = PlatformPosts::new();
        posts.insert(
            "twitter".to_string(),
            vec![
                tweet("1", "Why do threads work? 🧵", 90, 20),
                tweet("2", "Three tips:\none\ntwo\nthree", 300, 0),
                tweet("3", "Is this a question?", 99, 1),
                tweet("4", "Another question?", 101, 0),
            ],
        );
        let patterns = reflector().engagement_patterns(&posts);
        let names: Vec<EngagementIndicator> =
            patterns.high_engagement_indicators.into_iter().collect();
        assert_eq!(
            names,
            vec![
                EngagementIndicator::Educational,
                EngagementIndicator::MultiLine,
                EngagementIndicator::Question,
                EngagementIndicator::Thread,
            ]
        );
    }

    #[test]
    fn test_content_formats() {
        let long_hook = format!("How {}", "x".repeat(120));
        let mut posts = PlatformPosts::new();
        posts.insert(
            "twitter".to_string(),
            vec![
                tweet("1", &long_hook, 5, 1),
                tweet("2", "My writing process, a thread 1/", 3, 0),
                tweet("3", "plain update", 1, 0),
            ],
        );
        let formats = reflector().content_formats(&posts);
        assert_eq!(formats.hooks.len(), 1);
        assert_eq!(formats.hooks[0].content.chars().count(), 103);
        assert!(formats.hooks[0].content.ends_with("..."));
        assert_eq!(formats.hooks[0].engagement, 6);
        assert_eq!(formats.threads.len(), 1);
        assert_eq!(formats.threads[0].platform, "twitter");
    }

    #[test]
    fn test_recommendations() {
        let mut posts = PlatformPosts::new();
        posts.insert(
            "twitter".to_string(),
            vec![
                tweet("1", "content creation with automation", 10, 0),
                tweet("2", "content creation habits", 20, 0),
            ],
        );
        let reflection = reflector().reflect(&posts);
        let recs = &reflection.recommendations;

        assert_eq!(recs.content_ideas.len(), 5);
        assert_eq!(recs.content_ideas[0], "Create content around 'content' (trending)");
        assert_eq!(recs.format_suggestions.len(), 3);
        assert_eq!(
            recs.keyword_focus,
            vec!["content creation", "automation", "creation automation"]
        );
        // the last word of one post pairs with the first word of the next
        assert!(reflection.trending_terms().any(|t| t == "automation content"));
    }

    #[test]
    fn test_empty_input_falls_back() {
        let reflection = reflector().reflect(&PlatformPosts::new());
        assert!(reflection.platform_insights.is_empty());
        assert!(reflection.keyword_trends.is_empty());
        assert!(reflection.recommendations.content_ideas.is_empty());
        assert!(reflection.recommendations.format_suggestions.is_empty());
        assert_eq!(
            reflection.recommendations.keyword_focus,
            vec!["content creation", "productivity", "AI tools"]
        );
    }

    #[test]
    fn test_reflection_serializes() {
        let mut posts = PlatformPosts::new();
        posts.insert("reddit".to_string(), vec![reddit("a", "Writing every day", 12)]);
        let reflection = reflector().reflect(&posts);
        let json = serde_json::to_value(&reflection).unwrap();
        assert_eq!(json["platform_insights"]["reddit"]["total_posts"], 1);
        assert!(json["engagement_patterns"]["high_engagement_indicators"].is_array());
    }
}
