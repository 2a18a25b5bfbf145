use crate::{ContentSource, FetchWindow, PolitenessDelay};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use xthreads_core::{CoreError, Engagement, RawPost, SourceError};

const REDDIT_AUTH_BASE: &str = "https://www.reddit.com";
const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
const PLATFORM: &str = "reddit";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u64,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub stickied: bool,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

/// Hot posts from a list of subreddits, read with an app-only OAuth token.
#[derive(Debug)]
pub struct RedditSource {
    http_client: Client,
    credentials: RedditCredentials,
    subreddits: Vec<String>,
    auth_base: String,
    api_base: String,
    delay: PolitenessDelay,
}

impl RedditSource {
    pub fn new(
        credentials: RedditCredentials,
        subreddits: Vec<String>,
        delay: PolitenessDelay,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&credentials.user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            credentials,
            subreddits,
            auth_base: REDDIT_AUTH_BASE.to_string(),
            api_base: REDDIT_API_BASE.to_string(),
            delay,
        })
    }

    /// Points both the token and listing endpoints at `base`.
    pub fn with_base_url(mut self, base: &str) -> Self {
        self.auth_base = base.trim_end_matches('/').to_string();
        self.api_base = self.auth_base.clone();
        self
    }

    async fn access_token(&self) -> Result<String, CoreError> {
        let url = format!("{}/api/v1/access_token", self.auth_base);
        debug!("Requesting Reddit application token");

        let response = self
            .http_client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status(response, "/api/v1/access_token").await?;
        let token: AccessTokenResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Reddit token response: {}", e);
            SourceError::InvalidResponse {
                details: "Failed to parse access token".to_string(),
            }
        })?;
        Ok(token.access_token)
    }

    pub async fn get_subreddit_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: usize,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/hot", subreddit);
        let url = format!("{}{}", self.api_base, endpoint);
        let limit = limit.to_string();

        info!("Making Reddit API request: GET {}", endpoint);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("limit", limit.as_str()), ("raw_json", "1")])
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status(response, &endpoint).await.map_err(|e| match e {
            CoreError::Source(SourceError::Forbidden { .. }) => SourceError::SubredditNotFound {
                subreddit: subreddit.to_string(),
            }
            .into(),
            other => other,
        })?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            SourceError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            }
        })?;

        debug!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }
}

#[async_trait]
impl ContentSource for RedditSource {
    fn platform(&self) -> &str {
        PLATFORM
    }

    async fn fetch(&self, window: &FetchWindow) -> Result<Vec<RawPost>, CoreError> {
        if self.subreddits.is_empty() {
            warn!("No subreddits configured");
            return Ok(Vec::new());
        }

        let token = self.access_token().await?;
        let per_subreddit = (window.max_posts / self.subreddits.len()).max(1);
        let mut posts = Vec::new();

        for (i, subreddit) in self.subreddits.iter().enumerate() {
            if i > 0 {
                self.delay.wait().await;
            }

            match self
                .get_subreddit_posts(&token, subreddit, per_subreddit)
                .await
            {
                Ok(listing) => posts.extend(
                    listing
                        .data
                        .children
                        .into_iter()
                        .map(|child| child.data)
                        .filter(|data| !data.stickied && !data.over_18)
                        .map(RawPost::from)
                        .filter(|post| post.created_at >= window.since),
                ),
                Err(e) => {
                    warn!("Failed to scrape r/{}: {}", subreddit, e);
                }
            }
        }

        Ok(posts)
    }
}

async fn check_status(response: Response, endpoint: &str) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    error!("Request failed with status: {} for {}", status, endpoint);

    let err = match status.as_u16() {
        401 => SourceError::AuthenticationFailed {
            platform: PLATFORM.to_string(),
            reason: response.text().await.unwrap_or_default(),
        },
        403 | 404 => SourceError::Forbidden {
            resource: endpoint.to_string(),
        },
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            SourceError::RateLimitExceeded {
                platform: PLATFORM.to_string(),
                retry_after,
            }
        }
        code => SourceError::ServerError { status_code: code },
    };
    Err(err.into())
}

fn network_error(e: reqwest::Error) -> CoreError {
    if e.is_timeout() {
        SourceError::RequestTimeout.into()
    } else {
        CoreError::Network(e)
    }
}

impl From<RedditPostData> for RawPost {
    fn from(post_data: RedditPostData) -> Self {
        let created_at = DateTime::<Utc>::from_timestamp(post_data.created_utc as i64, 0)
            .unwrap_or_else(Utc::now);
        let url = url::Url::parse(REDDIT_AUTH_BASE)
            .and_then(|base| base.join(&post_data.permalink))
            .map(|u| u.to_string())
            .unwrap_or(post_data.url);

        Self {
            id: post_data.id,
            platform: PLATFORM.to_string(),
            text: post_data.selftext,
            title: Some(post_data.title),
            author: post_data.author,
            engagement: Engagement {
                score: post_data.score,
                comments: post_data.num_comments,
                ..Engagement::default()
            },
            created_at,
            url: Some(url),
            source: Some(post_data.subreddit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> RedditCredentials {
        RedditCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "xthreads-agent-test/1.0".to_string(),
        }
    }

    fn listing_child(id: &str, title: &str, score: i64, created_utc: i64) -> serde_json::Value {
        json!({
            "kind": "t3",
            "data": {
                "id": id,
                "title": title,
                "selftext": "Sharing my content workflow",
                "author": "maker",
                "subreddit": "SideProject",
                "url": format!("https://reddit.com/r/SideProject/comments/{id}"),
                "permalink": format!("/r/SideProject/comments/{id}/post/"),
                "created_utc": created_utc as f64,
                "score": score,
                "num_comments": 4
            }
        })
    }

    #[test]
    fn test_reddit_post_conversion() {
        let post_data = RedditPostData {
            id: "test123".to_string(),
            title: "Test Post".to_string(),
            selftext: "This is test content".to_string(),
            author: "test_user".to_string(),
            subreddit: "test".to_string(),
            url: "https://example.com/article".to_string(),
            permalink: "/r/test/comments/test123/".to_string(),
            created_utc: 1640995200.0,
            score: 42,
            num_comments: 5,
            over_18: false,
            stickied: false,
        };

        let post: RawPost = post_data.into();
        assert_eq!(post.id, "test123");
        assert_eq!(post.title.as_deref(), Some("Test Post"));
        assert_eq!(post.text, "This is test content");
        assert_eq!(post.engagement.score, 42);
        assert_eq!(post.engagement.comments, 5);
        assert_eq!(
            post.url.as_deref(),
            Some("https://www.reddit.com/r/test/comments/test123/")
        );
        assert_eq!(post.created_at.timestamp(), 1640995200);
    }

    #[tokio::test]
    async fn test_fetch_uses_token_and_drops_old_posts() {
        let server = MockServer::start().await;
        let now = Utc::now().timestamp();

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .and(header_exists("authorization"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tok", "token_type": "bearer"})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/r/SideProject/hot"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "Listing",
                "data": {
                    "children": [
                        listing_child("fresh", "Growing an audience", 120, now - 600),
                        listing_child("stale", "Old news", 900, now - 3 * 86_400),
                    ],
                    "after": null,
                    "before": null,
                    "dist": 2
                }
            })))
            .mount(&server)
            .await;

        let source = RedditSource::new(
            credentials(),
            vec!["SideProject".to_string()],
            PolitenessDelay::none(),
        )
        .unwrap()
        .with_base_url(&server.uri());

        let window = FetchWindow {
            since: Utc::now() - chrono::Duration::hours(24),
            max_posts: 10,
        };
        let posts = source.fetch(&window).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "fresh");
        assert_eq!(posts[0].source.as_deref(), Some("SideProject"));
    }

    #[tokio::test]
    async fn test_failing_subreddit_is_skipped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/private/hot"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let source = RedditSource::new(
            credentials(),
            vec!["private".to_string()],
            PolitenessDelay::none(),
        )
        .unwrap()
        .with_base_url(&server.uri());

        let window = FetchWindow {
            since: Utc::now() - chrono::Duration::hours(24),
            max_posts: 10,
        };
        assert!(source.fetch(&window).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_credentials_fail_the_source() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let source = RedditSource::new(
            credentials(),
            vec!["SideProject".to_string()],
            PolitenessDelay::none(),
        )
        .unwrap()
        .with_base_url(&server.uri());

        let window = FetchWindow {
            since: Utc::now(),
            max_posts: 10,
        };
        let err = source.fetch(&window).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Source(SourceError::AuthenticationFailed { .. })
        ));
    }
}
