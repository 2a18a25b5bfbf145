//! Content calendar exports: spreadsheet, CSV, Markdown and a JSON backup.

pub mod calendar;
pub mod writers;

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use xthreads_core::{CoreError, ErrorExt, GeneratedPost, PlatformPosts};

pub use calendar::{build_rows, summarize, CalendarRow, SummaryRow};

pub struct Exporter {
    export_dir: PathBuf,
    date: NaiveDate,
}

impl Exporter {
    pub fn new(export_dir: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            export_dir: export_dir.into(),
            date,
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    fn path(&self, stem: &str, ext: &str) -> PathBuf {
        self.export_dir.join(format!("{}-{}.{}", stem, self.date_str(), ext))
    }

    /// Writes every format independently and returns the files that made it
    /// to disk. A failing format is logged and left out.
    pub fn export(&self, posts: &PlatformPosts<GeneratedPost>) -> Result<Vec<PathBuf>, CoreError> {
        info!("Exporting content calendar...");
        fs::create_dir_all(&self.export_dir)?;

        let rows = build_rows(posts, self.date);
        let date = self.date_str();

        let mut exported = Vec::new();

        let path = self.path("content-calendar", "xlsx");
        keep(&mut exported, path.clone(), writers::write_xlsx(&rows, &path));

        let path = self.path("content-calendar", "csv");
        keep(&mut exported, path.clone(), writers::write_csv(&rows, &path));

        let path = self.path("content-calendar", "md");
        keep(&mut exported, path.clone(), writers::write_markdown(&rows, &date, &path));

        let path = self.path("content-backup", "json");
        keep(&mut exported, path.clone(), writers::write_json(posts, &path));

        info!("Exported {} files", exported.len());
        Ok(exported)
    }
}

fn keep(exported: &mut Vec<PathBuf>, path: PathBuf, result: Result<(), CoreError>) {
    match result {
        Ok(()) => {
            info!("Exported {}", path.display());
            exported.push(path);
        }
        Err(e) => {
            e.log_error();
        }
    }
}
