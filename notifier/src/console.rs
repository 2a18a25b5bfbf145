use crate::{Notification, NotificationChannel, RunSummary};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use xthreads_core::{title_case, CoreError};

const RULE_WIDTH: usize = 60;

const NEXT_STEPS: [&str; 4] = [
    "Review generated content in exported files",
    "Copy and paste posts to respective platforms",
    "Schedule posts at the planned times",
    "Monitor engagement and adjust strategy",
];

/// Prints a framed report to stdout.
#[derive(Debug, Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn new() -> Self {
        Self
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn render_completion(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "🎉 XTHREADS AGENT - DAILY RUN COMPLETE");
    let _ = writeln!(out, "{}", rule());

    let _ = writeln!(out, "📊 SUMMARY:");
    let _ = writeln!(out, "   • Total posts planned: {}", summary.total);
    let _ = writeln!(out, "   • Successfully generated: {}", summary.successful);
    let _ = writeln!(out, "   • Success rate: {}", summary.success_rate());

    let _ = writeln!(out, "\n📱 PLATFORM BREAKDOWN:");
    for tally in &summary.platforms {
        let _ = writeln!(
            out,
            "   • {}: {}/{} posts ready",
            title_case(&tally.platform),
            tally.ready,
            tally.total
        );
    }

    if !summary.exported_files.is_empty() {
        let _ = writeln!(out, "\n📤 EXPORTED FILES:");
        for path in &summary.exported_files {
            let _ = writeln!(out, "   • {}", path.display());
        }
    }

    let _ = writeln!(out, "\n🚀 NEXT STEPS:");
    for (i, step) in NEXT_STEPS.iter().enumerate() {
        let _ = writeln!(out, "   {}. {}", i + 1, step);
    }

    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "Generated at: {}", timestamp(&summary.finished_at));
    let _ = writeln!(out, "{}", rule());
    out
}

pub fn render_error(message: &str, at: &DateTime<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "❌ XTHREADS AGENT - ERROR OCCURRED");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "Error: {}", message);
    let _ = writeln!(out, "Time: {}", timestamp(at));
    let _ = writeln!(out, "Check logs for more details.");
    let _ = writeln!(out, "{}", rule());
    out
}

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), CoreError> {
        let text = match notification {
            Notification::Completion(summary) => render_completion(summary),
            Notification::Error { message, at } => render_error(message, at),
        };
        println!("{}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_posts;
    use std::path::PathBuf;

    #[test]
    fn test_completion_report() {
        let summary = RunSummary::from_posts(
            &sample_posts(),
            vec![PathBuf::from("data/exports/content-calendar-2026-10-19.csv")],
        );
        let text = render_completion(&summary);

        assert!(text.contains("DAILY RUN COMPLETE"));
        assert!(text.contains("   • Total posts planned: 5\n"));
        assert!(text.contains("   • Successfully generated: 4\n"));
        assert!(text.contains("   • Success rate: 80.0%\n"));
        assert!(text.contains("   • Reddit: 1/2 posts ready\n"));
        assert!(text.contains("   • Twitter: 3/3 posts ready\n"));
        assert!(text.contains("📤 EXPORTED FILES:\n   • data/exports/content-calendar-2026-10-19.csv"));
        assert!(text.contains("   4. Monitor engagement and adjust strategy"));
        assert!(text.find("Reddit").unwrap() < text.find("Twitter").unwrap());
    }

    #[test]
    fn test_completion_without_exports_skips_section() {
        let summary = RunSummary::from_posts(&sample_posts(), Vec::new());
        assert!(!render_completion(&summary).contains("EXPORTED FILES"));
    }

    #[test]
    fn test_error_report() {
        let text = render_error("reddit token rejected", &Local::now());
        assert!(text.contains("ERROR OCCURRED"));
        assert!(text.contains("Error: reddit token rejected\n"));
        assert!(text.contains("Check logs for more details."));
    }
}
