use crate::{ContentSource, FetchWindow, PolitenessDelay};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use xthreads_core::{CoreError, Engagement, RawPost, SourceError};

const TWITTER_API_BASE: &str = "https://api.twitter.com";
const PLATFORM: &str = "twitter";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    #[serde(default)]
    includes: Option<Includes>,
}

#[derive(Debug, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    public_metrics: PublicMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    reply_count: u64,
}

/// Recent tweets matching a set of search terms, via the v2 search endpoint.
#[derive(Debug)]
pub struct TwitterSource {
    http_client: Client,
    bearer_token: String,
    search_terms: Vec<String>,
    api_base: String,
    delay: PolitenessDelay,
}

impl TwitterSource {
    pub fn new(
        bearer_token: String,
        search_terms: Vec<String>,
        user_agent: &str,
        delay: PolitenessDelay,
    ) -> Result<Self, CoreError> {
        if bearer_token.trim().is_empty() {
            return Err(SourceError::MissingCredentials {
                platform: PLATFORM.to_string(),
            }
            .into());
        }

        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            bearer_token,
            search_terms,
            api_base: TWITTER_API_BASE.to_string(),
            delay,
        })
    }

    pub fn with_base_url(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    async fn search(
        &self,
        term: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<RawPost>, CoreError> {
        let url = format!("{}/2/tweets/search/recent", self.api_base);
        let query = format!("\"{}\" -is:retweet lang:en", term);
        let max_results = limit.clamp(10, 100).to_string();
        let start_time = since.to_rfc3339_opts(SecondsFormat::Secs, true);

        info!("Searching recent tweets for {:?}", term);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", max_results.as_str()),
                ("start_time", start_time.as_str()),
                ("tweet.fields", "created_at,public_metrics,author_id"),
                ("expansions", "author_id"),
                ("user.fields", "username"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::from(SourceError::RequestTimeout)
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Tweet search failed with status: {}", status);
            let err = match status.as_u16() {
                401 => SourceError::AuthenticationFailed {
                    platform: PLATFORM.to_string(),
                    reason: response.text().await.unwrap_or_default(),
                },
                403 => SourceError::Forbidden {
                    resource: "/2/tweets/search/recent".to_string(),
                },
                429 => SourceError::RateLimitExceeded {
                    platform: PLATFORM.to_string(),
                    retry_after: rate_limit_reset(&response),
                },
                code => SourceError::ServerError { status_code: code },
            };
            return Err(err.into());
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            error!("Failed to parse tweet search response: {}", e);
            SourceError::InvalidResponse {
                details: format!("Failed to parse search results for {:?}", term),
            }
        })?;

        let usernames: HashMap<String, String> = body
            .includes
            .map(|includes| {
                includes
                    .users
                    .into_iter()
                    .map(|u| (u.id, u.username))
                    .collect()
            })
            .unwrap_or_default();

        let posts: Vec<RawPost> = body
            .data
            .into_iter()
            .take(limit)
            .map(|tweet| tweet_to_post(tweet, &usernames, term))
            .collect();
        debug!("Retrieved {} tweets for {:?}", posts.len(), term);
        Ok(posts)
    }
}

#[async_trait]
impl ContentSource for TwitterSource {
    fn platform(&self) -> &str {
        PLATFORM
    }

    async fn fetch(&self, window: &FetchWindow) -> Result<Vec<RawPost>, CoreError> {
        if self.search_terms.is_empty() {
            warn!("No search terms configured");
            return Ok(Vec::new());
        }

        let per_term = (window.max_posts / self.search_terms.len()).max(1);
        let mut posts: Vec<RawPost> = Vec::new();

        for (i, term) in self.search_terms.iter().enumerate() {
            if i > 0 {
                self.delay.wait().await;
            }
            match self.search(term, window.since, per_term).await {
                Ok(found) => {
                    for post in found {
                        if !posts.iter().any(|p| p.id == post.id) {
                            posts.push(post);
                        }
                    }
                }
                Err(e @ CoreError::Source(SourceError::AuthenticationFailed { .. })) => {
                    return Err(e);
                }
                Err(e) => warn!("Search for {:?} failed: {}", term, e),
            }
        }

        posts.truncate(window.max_posts);
        Ok(posts)
    }
}

fn rate_limit_reset(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .map(|reset| (reset - Utc::now().timestamp()).max(0) as u64)
        .unwrap_or(900)
}

fn tweet_to_post(tweet: Tweet, usernames: &HashMap<String, String>, term: &str) -> RawPost {
    let author = tweet
        .author_id
        .as_ref()
        .and_then(|id| usernames.get(id))
        .cloned()
        .or(tweet.author_id)
        .unwrap_or_default();
    let url = (!author.is_empty()).then(|| format!("https://x.com/{}/status/{}", author, tweet.id));

    RawPost {
        id: tweet.id,
        platform: PLATFORM.to_string(),
        text: tweet.text,
        title: None,
        author,
        engagement: Engagement {
            likes: tweet.public_metrics.like_count,
            retweets: tweet.public_metrics.retweet_count,
            replies: tweet.public_metrics.reply_count,
            ..Engagement::default()
        },
        created_at: tweet.created_at.unwrap_or_else(Utc::now),
        url,
        source: Some(term.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer, terms: &[&str]) -> TwitterSource {
        TwitterSource::new(
            "bearer".to_string(),
            terms.iter().map(|t| t.to_string()).collect(),
            "xthreads-agent-test/1.0",
            PolitenessDelay::none(),
        )
        .unwrap()
        .with_base_url(&server.uri())
    }

    fn window() -> FetchWindow {
        FetchWindow {
            since: Utc::now() - chrono::Duration::hours(24),
            max_posts: 20,
        }
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = TwitterSource::new(
            "  ".to_string(),
            vec!["threads".to_string()],
            "test",
            PolitenessDelay::none(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Source(SourceError::MissingCredentials { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_maps_metrics_and_usernames() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/search/recent"))
            .and(header("authorization", "Bearer bearer"))
            .and(query_param("query", "\"build in public\" -is:retweet lang:en"))
            .and(query_param("max_results", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "1001",
                    "text": "What is your writing routine?",
                    "author_id": "42",
                    "created_at": "2026-10-18T09:30:00.000Z",
                    "public_metrics": {"like_count": 80, "retweet_count": 12, "reply_count": 9, "quote_count": 1}
                }],
                "includes": {"users": [{"id": "42", "username": "maker", "name": "Maker"}]}
            })))
            .mount(&server)
            .await;

        let posts = source(&server, &["build in public"])
            .fetch(&window())
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.author, "maker");
        assert_eq!(post.engagement.likes, 80);
        assert_eq!(post.engagement.retweets, 12);
        assert_eq!(post.engagement.replies, 9);
        assert_eq!(post.url.as_deref(), Some("https://x.com/maker/status/1001"));
        assert_eq!(post.source.as_deref(), Some("build in public"));
    }

    #[tokio::test]
    async fn test_empty_result_and_failed_term() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/search/recent"))
            .and(query_param("query", "\"quiet\" -is:retweet lang:en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"result_count": 0}})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/search/recent"))
            .and(query_param("query", "\"busy\" -is:retweet lang:en"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let posts = source(&server, &["quiet", "busy"])
            .fetch(&window())
            .await
            .unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_fails_the_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/tweets/search/recent"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = source(&server, &["threads"])
            .fetch(&window())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Source(SourceError::AuthenticationFailed { .. })
        ));
    }
}
