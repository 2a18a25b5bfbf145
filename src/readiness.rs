//! `check` subcommand: is this machine ready for a scheduled run?

use std::fmt::Write as _;
use std::path::Path;
use xthreads_core::{AppConfig, FileConfig, Secrets};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    /// Optional item missing; the run still works with less.
    Warning,
    Failed,
}

impl CheckStatus {
    fn icon(self) -> &'static str {
        match self {
            CheckStatus::Ok => "✅",
            CheckStatus::Warning => "⚠️ ",
            CheckStatus::Failed => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    pub status: CheckStatus,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReadinessReport {
    pub items: Vec<CheckItem>,
}

impl ReadinessReport {
    fn push(&mut self, status: CheckStatus, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }

    pub fn is_ready(&self) -> bool {
        self.items.iter().all(|i| i.status != CheckStatus::Failed)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "🧪 Checking xthreads-agent setup...");
        let _ = writeln!(out, "{}", "=".repeat(50));
        for item in &self.items {
            let _ = writeln!(out, "{} {}", item.status.icon(), item.message);
        }
        let _ = writeln!(out, "{}", "=".repeat(50));
        if self.is_ready() {
            let _ = writeln!(out, "🎉 Ready to run");
        } else {
            let _ = writeln!(out, "Fix the items marked ❌ before scheduling a run");
        }
        out
    }
}

/// Checks the config file, the environment and the data directories.
/// `lookup` reads environment variables.
pub fn check(config_path: &Path, lookup: impl Fn(&str) -> Option<String>) -> ReadinessReport {
    let mut report = ReadinessReport::default();

    let file = match FileConfig::from_path(config_path) {
        Ok(file) => {
            report.push(
                CheckStatus::Ok,
                format!("Configuration loaded from {}", config_path.display()),
            );
            Some(file)
        }
        Err(e) => {
            report.push(CheckStatus::Failed, format!("Configuration error: {}", e));
            None
        }
    };

    for var in Secrets::REQUIRED {
        match lookup(var).filter(|v| !v.trim().is_empty()) {
            Some(_) => report.push(CheckStatus::Ok, format!("{} is set", var)),
            None => report.push(CheckStatus::Failed, format!("{} is missing (required)", var)),
        }
    }
    for var in Secrets::OPTIONAL {
        match lookup(var).filter(|v| !v.trim().is_empty()) {
            Some(_) => report.push(CheckStatus::Ok, format!("{} is set", var)),
            None => report.push(CheckStatus::Warning, format!("{} is not set (optional)", var)),
        }
    }

    let Some(file) = file else {
        return report;
    };

    let secrets = Secrets::from_lookup(&lookup);
    if let Err(e) = AppConfig::from_parts(file.clone(), secrets, &lookup) {
        report.push(CheckStatus::Failed, format!("Configuration is invalid: {}", e));
    }

    let enabled: Vec<&str> = file.enabled_platforms().map(|(n, _)| n.as_str()).collect();
    if enabled.is_empty() {
        report.push(CheckStatus::Warning, "No platforms are enabled");
    } else {
        report.push(
            CheckStatus::Ok,
            format!("Enabled platforms: {}", enabled.join(", ")),
        );
    }

    for (label, dir) in [
        ("data", file.paths.data_dir.as_path()),
        ("logs", file.paths.log_dir.as_path()),
    ] {
        if dir.is_dir() {
            report.push(CheckStatus::Ok, format!("Directory '{}' exists", dir.display()));
        } else {
            report.push(
                CheckStatus::Warning,
                format!("{} directory '{}' will be created on first run", label, dir.display()),
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_ready_with_key_and_config() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        let path = write_config(
            &dir,
            &format!("[paths]\ndata_dir = {:?}\n", data.display().to_string()),
        );

        let report = check(&path, |key| {
            (key == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        });
        assert!(report.is_ready());

        let text = report.render();
        assert!(text.contains("✅ OPENAI_API_KEY is set"));
        assert!(text.contains("TELEGRAM_BOT_TOKEN is not set (optional)"));
        assert!(text.contains("Enabled platforms: reddit, twitter"));
        assert!(text.contains("🎉 Ready to run"));
    }

    #[test]
    fn test_missing_key_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");
        let report = check(&path, |_| None);
        assert!(!report.is_ready());
        assert!(report.render().contains("❌ OPENAI_API_KEY is missing (required)"));
    }

    #[test]
    fn test_missing_config_file_fails() {
        let dir = TempDir::new().unwrap();
        let report = check(&dir.path().join("nope.toml"), |key| {
            (key == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        });
        assert!(!report.is_ready());
        assert_eq!(report.items[0].status, CheckStatus::Failed);
    }

    #[test]
    fn test_invalid_values_fail() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[platforms.twitter]\nenabled = true\nposts_per_day = 0\n");
        let report = check(&path, |key| {
            (key == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        });
        assert!(!report.is_ready());
    }
}
