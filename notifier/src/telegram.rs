use crate::{Notification, NotificationChannel, RunSummary};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::debug;
use xthreads_core::{title_case, CoreError, NotifyError};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";
const CHANNEL: &str = "telegram";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Bot API `sendMessage` with Markdown formatting.
pub struct TelegramChannel {
    bot_token: String,
    chat_id: String,
    http: Client,
    base_url: String,
}

impl TelegramChannel {
    pub fn new(bot_token: &str, chat_id: &str) -> Result<Self, CoreError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            http,
            base_url: TELEGRAM_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn send(&self, text: &str) -> Result<(), CoreError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        debug!("Posting Telegram message ({} chars)", text.chars().count());
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                channel: CHANNEL.to_string(),
                details: format!("{}: {}", status.as_u16(), details),
            }
            .into());
        }
        Ok(())
    }
}

fn minute(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn render_completion(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str("🤖 *xthreads\\_agent Daily Report*\n\n");
    out.push_str("📊 *Summary:*\n");
    let _ = writeln!(out, "• Total posts: {}", summary.total);
    let _ = writeln!(out, "• Generated successfully: {}", summary.successful);
    let _ = writeln!(out, "• Success rate: {}", summary.success_rate());

    out.push_str("\n📱 *Platform Breakdown:*\n");
    for tally in &summary.platforms {
        let _ = writeln!(
            out,
            "• {}: {}/{}",
            title_case(&tally.platform),
            tally.ready,
            tally.total
        );
    }

    out.push_str("\n✅ Content is ready for posting!");
    let _ = write!(out, "\n📅 Generated: {}", minute(&summary.finished_at));
    out
}

pub fn render_error(message: &str, at: &DateTime<Local>) -> String {
    format!(
        "❌ *xthreads\\_agent Error*\n\nError: `{}`\nTime: {}\n\nPlease check the logs for more details.",
        message.replace('`', "'"),
        minute(at)
    )
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, notification: &Notification) -> Result<(), CoreError> {
        let text = match notification {
            Notification::Completion(summary) => render_completion(summary),
            Notification::Error { message, at } => render_error(message, at),
        };
        self.send(&text).await
    }
}
