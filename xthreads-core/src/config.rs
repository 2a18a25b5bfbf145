//! Run configuration.
//!
//! Non-secret settings come from a TOML file (`config.toml`); API keys and
//! chat credentials come from the environment, optionally seeded from `.env`.

use crate::error::ConfigError;
use crate::types::{EngagementFormula, TimeSlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub platforms: BTreeMap<String, PlatformConfig>,
    pub scraping: ScrapingConfig,
    pub content_filters: FilterConfig,
    pub analysis: AnalysisConfig,
    pub generation: GenerationConfig,
    pub notifications: NotificationConfig,
    pub paths: PathsConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        let mut platforms = BTreeMap::new();
        platforms.insert(
            "twitter".to_string(),
            PlatformConfig {
                enabled: true,
                posts_per_day: 3,
                content_types: vec!["hook".into(), "thread".into(), "tip".into()],
                optimal_times: ["14:00", "15:30", "17:00"]
                    .iter()
                    .filter_map(|t| t.parse().ok())
                    .collect(),
                max_chars: 280,
                search_terms: vec![
                    "indie hacker".into(),
                    "startup founder".into(),
                    "content creation".into(),
                    "twitter growth".into(),
                    "social media tips".into(),
                    "building in public".into(),
                ],
                ..PlatformConfig::default()
            },
        );
        platforms.insert(
            "reddit".to_string(),
            PlatformConfig {
                enabled: true,
                posts_per_day: 1,
                content_types: vec!["discussion".into(), "experience".into()],
                optimal_times: ["12:00", "14:30"]
                    .iter()
                    .filter_map(|t| t.parse().ok())
                    .collect(),
                max_chars: 1000,
                engagement: Some(EngagementFormula::Score),
                subreddits: vec![
                    "Entrepreneur".into(),
                    "SideProject".into(),
                    "socialmedia".into(),
                    "content_marketing".into(),
                ],
                ..PlatformConfig::default()
            },
        );

        Self {
            platforms,
            scraping: ScrapingConfig::default(),
            content_filters: FilterConfig::default(),
            analysis: AnalysisConfig::default(),
            generation: GenerationConfig::default(),
            notifications: NotificationConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub enabled: bool,
    pub posts_per_day: usize,
    pub content_types: Vec<String>,
    pub optimal_times: Vec<TimeSlot>,
    pub max_chars: usize,
    /// Overrides the platform's default engagement formula.
    pub engagement: Option<EngagementFormula>,
    pub subreddits: Vec<String>,
    pub search_terms: Vec<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            posts_per_day: 1,
            content_types: vec!["general".to_string()],
            optimal_times: TimeSlot::from_hm(12, 0).into_iter().collect(),
            max_chars: 500,
            engagement: None,
            subreddits: Vec::new(),
            search_terms: Vec::new(),
        }
    }
}

impl PlatformConfig {
    /// Reddit ranks by score; everything else sums interactions.
    pub fn engagement_formula(&self, platform: &str) -> EngagementFormula {
        self.engagement.unwrap_or(match platform {
            "reddit" => EngagementFormula::Score,
            _ => EngagementFormula::Interactions,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub max_posts_per_platform: usize,
    pub lookback_hours: i64,
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    pub user_agent: String,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            max_posts_per_platform: 50,
            lookback_hours: 24,
            min_delay_secs: 1.0,
            max_delay_secs: 3.0,
            user_agent: "xthreads-agent/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub profanity: bool,
    pub politics: bool,
    pub nsfw: bool,
    /// Always enforced.
    pub competitors: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            profanity: true,
            politics: true,
            nsfw: true,
            competitors: vec!["typefully".into(), "hypefury".into(), "tweethunter".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub high_performer_fraction: f64,
    pub min_high_performers: usize,
    pub trending_limit: usize,
    pub top_keywords_per_platform: usize,
    pub high_engagement_threshold: i64,
    pub include_bigrams: bool,
    /// Tokens shorter than this are ignored.
    pub min_token_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            high_performer_fraction: 0.2,
            min_high_performers: 1,
            trending_limit: 20,
            top_keywords_per_platform: 10,
            high_engagement_threshold: 100,
            include_bigrams: true,
            min_token_chars: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub min_chars: usize,
    /// Replaces the built-in product voice prompt.
    pub system_prompt: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_retries: 2,
            retry_delay_secs: 2,
            max_tokens: 500,
            temperature: 0.7,
            min_chars: 50,
            system_prompt: None,
        }
    }
}

impl GenerationConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub console: bool,
    pub desktop: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            console: true,
            desktop: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub export_dir: Option<PathBuf>,
    pub log_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            export_dir: None,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl PathsConfig {
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("exports"))
    }
}

/// Credentials read from the environment. Every field is optional; the
/// component that needs one reports its absence.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: Option<String>,
    pub twitter_bearer_token: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Secrets {
    pub const REQUIRED: &'static [&'static str] = &["OPENAI_API_KEY"];
    pub const OPTIONAL: &'static [&'static str] = &[
        "REDDIT_CLIENT_ID",
        "REDDIT_CLIENT_SECRET",
        "TWITTER_BEARER_TOKEN",
        "TELEGRAM_BOT_TOKEN",
        "TELEGRAM_CHAT_ID",
    ];

    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            reddit_client_id: get("REDDIT_CLIENT_ID"),
            reddit_client_secret: get("REDDIT_CLIENT_SECRET"),
            reddit_user_agent: get("REDDIT_USER_AGENT"),
            twitter_bearer_token: get("TWITTER_BEARER_TOKEN"),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
        }
    }

    pub fn telegram(&self) -> Option<(&str, &str)> {
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(token), Some(chat)) => Some((token.as_str(), chat.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub file: FileConfig,
    pub secrets: Secrets,
}

impl AppConfig {
    /// Reads `path`, applies `GPT_MODEL` / `MAX_RETRIES` overrides and validates.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env();
        let file = FileConfig::from_path(path)?;
        Self::from_parts(file, secrets, |key| std::env::var(key).ok())
    }

    pub fn from_parts(
        mut file: FileConfig,
        secrets: Secrets,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(model) = lookup("GPT_MODEL").filter(|m| !m.is_empty()) {
            debug!("GPT_MODEL override: {}", model);
            file.generation.model = model;
        }
        if let Some(raw) = lookup("MAX_RETRIES") {
            file.generation.max_retries =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: "MAX_RETRIES".to_string(),
                        value: raw.clone(),
                    })?;
        }

        file.validate()?;
        if let Some(base) = &secrets.openai_base_url {
            url::Url::parse(base).map_err(|_| ConfigError::InvalidValue {
                field: "OPENAI_BASE_URL".to_string(),
                value: base.clone(),
            })?;
        }

        info!(
            "Config loaded: {} enabled platform(s), model {}",
            file.enabled_platforms().count(),
            file.generation.model
        );
        Ok(Self { file, secrets })
    }
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn enabled_platforms(&self) -> impl Iterator<Item = (&String, &PlatformConfig)> {
        self.platforms.iter().filter(|(_, p)| p.enabled)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, platform) in &self.platforms {
            if platform.posts_per_day == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("platforms.{name}.posts_per_day"),
                    value: "0".to_string(),
                });
            }
            if platform.max_chars == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("platforms.{name}.max_chars"),
                    value: "0".to_string(),
                });
            }
        }

        let fraction = self.analysis.high_performer_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "analysis.high_performer_fraction".to_string(),
                value: fraction.to_string(),
            });
        }

        let scraping = &self.scraping;
        if scraping.min_delay_secs < 0.0 || scraping.max_delay_secs < scraping.min_delay_secs {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "scraping delay range [{}, {}] is invalid",
                    scraping.min_delay_secs, scraping.max_delay_secs
                ),
            });
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "generation.temperature".to_string(),
                value: self.generation.temperature.to_string(),
            });
        }

        Ok(())
    }
}
