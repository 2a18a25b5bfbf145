//! Run reports: a console banner, an optional Telegram message and an
//! optional desktop toast.

pub mod console;
pub mod desktop;
pub mod telegram;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use xthreads_core::{
    CoreError, ErrorExt, GeneratedPost, NotificationConfig, PlatformPosts, Secrets,
};

pub use console::ConsoleChannel;
pub use desktop::DesktopChannel;
pub use telegram::TelegramChannel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformTally {
    pub platform: String,
    pub ready: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub platforms: Vec<PlatformTally>,
    pub exported_files: Vec<PathBuf>,
    pub finished_at: DateTime<Local>,
}

impl RunSummary {
    pub fn from_posts(posts: &PlatformPosts<GeneratedPost>, exported_files: Vec<PathBuf>) -> Self {
        let platforms: Vec<PlatformTally> = posts
            .iter()
            .map(|(platform, posts)| PlatformTally {
                platform: platform.clone(),
                ready: posts.iter().filter(|p| p.is_success()).count(),
                total: posts.len(),
            })
            .collect();

        Self {
            total: platforms.iter().map(|p| p.total).sum(),
            successful: platforms.iter().map(|p| p.ready).sum(),
            platforms,
            exported_files,
            finished_at: Local::now(),
        }
    }

    /// One decimal place, or a bare `0%` when nothing was planned.
    pub fn success_rate(&self) -> String {
        if self.total == 0 {
            return "0%".to_string();
        }
        format!(
            "{:.1}%",
            self.successful as f64 / self.total as f64 * 100.0
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Completion(RunSummary),
    Error { message: String, at: DateTime<Local> },
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Notification::Error {
            message: message.into(),
            at: Local::now(),
        }
    }
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, notification: &Notification) -> Result<(), CoreError>;
}

/// Fans a notification out to every configured channel. A failing channel is
/// logged and does not stop the others.
#[derive(Default)]
pub struct Notifier {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &NotificationConfig, secrets: &Secrets) -> Result<Self, CoreError> {
        let mut notifier = Self::new();
        if config.console {
            notifier = notifier.with_channel(Box::new(ConsoleChannel::new()));
        }
        if let Some((token, chat_id)) = secrets.telegram() {
            notifier = notifier.with_channel(Box::new(TelegramChannel::new(token, chat_id)?));
        }
        if config.desktop {
            notifier = notifier.with_channel(Box::new(DesktopChannel::new()));
        }
        Ok(notifier)
    }

    pub fn with_channel(mut self, channel: Box<dyn NotificationChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Returns how many channels accepted the notification.
    pub async fn notify(&self, notification: &Notification) -> usize {
        info!("Sending notifications to {} channel(s)", self.channels.len());
        let mut delivered = 0;
        for channel in &self.channels {
            match channel.notify(notification).await {
                Ok(()) => {
                    info!("Notification sent via {}", channel.name());
                    delivered += 1;
                }
                Err(e) => {
                    warn!("Notification via {} failed", channel.name());
                    e.log_error();
                }
            }
        }
        delivered
    }
}
