use chrono::{DateTime, Utc};
use llm_interface::{Generator, OpenAiProvider};
use social_client::{
    ContentSource, FetchWindow, Listener, PolitenessDelay, RedditCredentials, RedditSource,
    SnapshotSource, TwitterSource,
};
use tracing::{info, warn};
use xthreads_core::{
    AppConfig, ContentFilter, CoreError, LlmError, PlatformConfig, Secrets, SnapshotStore,
};

const DEFAULT_REDDIT_USER_AGENT: &str = "xthreads-agent/0.1";

/// How the listener gets its posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Live,
    /// Every platform reads the raw snapshot saved for the run date.
    Replay,
}

/// One source per enabled platform. Platforms with an API but no
/// credentials are skipped; platforms without an API replay their snapshot.
pub fn build_sources(
    config: &AppConfig,
    store: &SnapshotStore,
    mode: SourceMode,
) -> Result<Vec<Box<dyn ContentSource>>, CoreError> {
    let delay = PolitenessDelay::from_config(&config.file.scraping);
    let mut sources: Vec<Box<dyn ContentSource>> = Vec::new();

    for (name, platform) in config.file.enabled_platforms() {
        if mode == SourceMode::Replay {
            sources.push(Box::new(SnapshotSource::new(name.as_str(), store.clone())));
            continue;
        }

        match live_source(name, platform, config, store, delay)? {
            Some(source) => sources.push(source),
            None => warn!("No credentials for {}, skipping its listener", name),
        }
    }

    info!("Configured {} content source(s)", sources.len());
    Ok(sources)
}

fn live_source(
    name: &str,
    platform: &PlatformConfig,
    config: &AppConfig,
    store: &SnapshotStore,
    delay: PolitenessDelay,
) -> Result<Option<Box<dyn ContentSource>>, CoreError> {
    let secrets = &config.secrets;
    let source: Box<dyn ContentSource> = match name {
        "reddit" => {
            let Some(credentials) = reddit_credentials(secrets) else {
                return Ok(None);
            };
            Box::new(RedditSource::new(
                credentials,
                platform.subreddits.clone(),
                delay,
            )?)
        }
        "twitter" => {
            let Some(token) = secrets.twitter_bearer_token.clone() else {
                return Ok(None);
            };
            Box::new(TwitterSource::new(
                token,
                platform.search_terms.clone(),
                &config.file.scraping.user_agent,
                delay,
            )?)
        }
        other => {
            info!("{} has no API client, replaying its raw snapshot", other);
            Box::new(SnapshotSource::new(other, store.clone()))
        }
    };
    Ok(Some(source))
}

fn reddit_credentials(secrets: &Secrets) -> Option<RedditCredentials> {
    Some(RedditCredentials {
        client_id: secrets.reddit_client_id.clone()?,
        client_secret: secrets.reddit_client_secret.clone()?,
        user_agent: secrets
            .reddit_user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_REDDIT_USER_AGENT.to_string()),
    })
}

pub fn build_listener(
    config: &AppConfig,
    store: &SnapshotStore,
    mode: SourceMode,
    now: DateTime<Utc>,
) -> Result<Listener, CoreError> {
    let filter = ContentFilter::new(&config.file.content_filters);
    let window = FetchWindow::lookback(now, &config.file.scraping);
    let listener = build_sources(config, store, mode)?
        .into_iter()
        .fold(Listener::new(filter, window), Listener::with_source);
    Ok(listener)
}

/// The OpenAI-backed generator. A missing key is an error.
pub fn build_generator(config: &AppConfig) -> Result<Generator, CoreError> {
    let api_key =
        config
            .secrets
            .openai_api_key
            .as_deref()
            .ok_or_else(|| LlmError::InvalidApiKey {
                provider: "openai".to_string(),
            })?;

    let mut provider = OpenAiProvider::new(api_key, &config.file.generation.model)?;
    if let Some(base) = &config.secrets.openai_base_url {
        provider = provider.with_base_url(base);
    }
    Ok(Generator::new(Box::new(provider), &config.file.generation))
}
