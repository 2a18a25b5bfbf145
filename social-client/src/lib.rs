//! Content sources for trending posts and the listener that drives them.

pub mod delay;
pub mod reddit;
pub mod snapshot_source;
pub mod twitter;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::{info, warn};
use xthreads_core::{ContentFilter, CoreError, PlatformPosts, RawPost, ScrapingConfig};

pub use delay::PolitenessDelay;
pub use reddit::{RedditCredentials, RedditSource};
pub use snapshot_source::SnapshotSource;
pub use twitter::TwitterSource;

/// What a source should return: posts created at or after `since`, at most
/// `max_posts` of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub since: DateTime<Utc>,
    pub max_posts: usize,
}

impl FetchWindow {
    pub fn lookback(now: DateTime<Utc>, config: &ScrapingConfig) -> Self {
        Self {
            since: now - Duration::hours(config.lookback_hours),
            max_posts: config.max_posts_per_platform,
        }
    }
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    fn platform(&self) -> &str;

    async fn fetch(&self, window: &FetchWindow) -> Result<Vec<RawPost>, CoreError>;
}

pub struct Listener {
    sources: Vec<Box<dyn ContentSource>>,
    filter: ContentFilter,
    window: FetchWindow,
}

impl Listener {
    pub fn new(filter: ContentFilter, window: FetchWindow) -> Self {
        Self {
            sources: Vec::new(),
            filter,
            window,
        }
    }

    pub fn with_source(mut self, source: Box<dyn ContentSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Fetches every source in turn. A failing source contributes an empty
    /// list; posts failing the safety filter are dropped.
    pub async fn scrape_all(&self) -> PlatformPosts<RawPost> {
        let mut results: PlatformPosts<RawPost> = BTreeMap::new();

        for source in &self.sources {
            let platform = source.platform().to_string();
            info!("Scraping {} trending content...", platform);

            let accepted = match source.fetch(&self.window).await {
                Ok(posts) => {
                    let fetched = posts.len();
                    let safe: Vec<RawPost> = posts
                        .into_iter()
                        .filter(|post| self.filter.is_safe(&post.full_text()))
                        .collect();
                    info!(
                        "Scraped {} {} posts ({} filtered out)",
                        safe.len(),
                        platform,
                        fetched - safe.len()
                    );
                    safe
                }
                Err(e) => {
                    warn!("{} scraping failed: {}", platform, e);
                    Vec::new()
                }
            };

            results.entry(platform).or_default().extend(accepted);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xthreads_core::{Engagement, FilterConfig, SourceError};

    struct FixedSource {
        platform: &'static str,
        posts: Vec<RawPost>,
    }

    #[async_trait]
    impl ContentSource for FixedSource {
        fn platform(&self) -> &str {
            self.platform
        }

        async fn fetch(&self, _window: &FetchWindow) -> Result<Vec<RawPost>, CoreError> {
            Ok(self.posts.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl ContentSource for BrokenSource {
        fn platform(&self) -> &str {
            "reddit"
        }

        async fn fetch(&self, _window: &FetchWindow) -> Result<Vec<RawPost>, CoreError> {
            Err(SourceError::ServerError { status_code: 503 }.into())
        }
    }

    fn post(id: &str, text: &str) -> RawPost {
        RawPost {
            id: id.to_string(),
            platform: "twitter".to_string(),
            text: text.to_string(),
            title: None,
            author: "someone".to_string(),
            engagement: Engagement::default(),
            created_at: Utc::now(),
            url: None,
            source: None,
        }
    }

    fn listener() -> Listener {
        let window = FetchWindow::lookback(Utc::now(), &ScrapingConfig::default());
        Listener::new(ContentFilter::new(&FilterConfig::default()), window)
    }

    #[test]
    fn test_lookback_window() {
        let now = Utc::now();
        let window = FetchWindow::lookback(now, &ScrapingConfig::default());
        assert_eq!(now - window.since, Duration::hours(24));
        assert_eq!(window.max_posts, 50);
    }

    #[tokio::test]
    async fn test_unsafe_posts_are_dropped() {
        let listener = listener().with_source(Box::new(FixedSource {
            platform: "twitter",
            posts: vec![
                post("1", "How I write threads every morning"),
                post("2", "The election results are in"),
                post("3", ""),
            ],
        }));

        let results = listener.scrape_all().await;
        let twitter = &results["twitter"];
        assert_eq!(twitter.len(), 1);
        assert_eq!(twitter[0].id, "1");
    }

    #[tokio::test]
    async fn test_failing_source_yields_empty_platform() {
        let listener = listener()
            .with_source(Box::new(BrokenSource))
            .with_source(Box::new(FixedSource {
                platform: "twitter",
                posts: vec![post("1", "Writing tips for founders")],
            }));
        assert_eq!(listener.source_count(), 2);

        let results = listener.scrape_all().await;
        assert!(results["reddit"].is_empty());
        assert_eq!(results["twitter"].len(), 1);
    }
}
