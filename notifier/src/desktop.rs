use crate::{Notification, NotificationChannel};
use async_trait::async_trait;
use notify_rust::Notification as Toast;
use tracing::debug;
use xthreads_core::{CoreError, NotifyError};

const CHANNEL: &str = "desktop";
const APP_NAME: &str = "xthreads-agent";

/// Native desktop toast via `notify-rust`.
#[derive(Debug, Default)]
pub struct DesktopChannel;

impl DesktopChannel {
    pub fn new() -> Self {
        Self
    }
}

/// Summary line and body for a toast.
pub fn toast_text(notification: &Notification) -> (String, String) {
    match notification {
        Notification::Completion(summary) => (
            "Content ready".to_string(),
            format!(
                "{}/{} posts generated ({})",
                summary.successful,
                summary.total,
                summary.success_rate()
            ),
        ),
        Notification::Error { message, .. } => ("Run failed".to_string(), message.clone()),
    }
}

#[async_trait]
impl NotificationChannel for DesktopChannel {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, notification: &Notification) -> Result<(), CoreError> {
        let (summary, body) = toast_text(notification);
        debug!("Showing desktop notification: {}", summary);

        // The platform notification APIs block.
        tokio::task::spawn_blocking(move || {
            Toast::new()
                .appname(APP_NAME)
                .summary(&summary)
                .body(&body)
                .show()
                .map(|_| ())
                .map_err(|e| NotifyError::Unavailable {
                    channel: CHANNEL.to_string(),
                    reason: e.to_string(),
                })
        })
        .await
        .map_err(|e| CoreError::Internal {
            message: format!("desktop notification task failed: {}", e),
        })?
        .map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_posts;
    use crate::RunSummary;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_toast_text() {
        let summary = RunSummary::from_posts(&sample_posts(), Vec::new());
        assert_eq!(
            toast_text(&Notification::Completion(summary)),
            (
                "Content ready".to_string(),
                "4/5 posts generated (80.0%)".to_string()
            )
        );
        assert_eq!(
            toast_text(&Notification::error("no sources")).1,
            "no sources"
        );
    }
}
