//! Keyword extraction and engagement analysis over scraped posts.

pub mod keywords;
pub mod reflector;

pub use keywords::{KeywordConfig, KeywordCount, KeywordExtractor, KeywordTable};
pub use reflector::{
    ContentFormats, EngagementIndicator, EngagementPatterns, FormatSample, LengthStats,
    PlatformInsight, Recommendations, Reflection, Reflector,
};
