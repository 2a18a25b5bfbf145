use crate::error::{CoreError, SourceError};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    Processed,
    Plans,
    Generated,
}

impl Stage {
    pub fn dir_name(self) -> &'static str {
        match self {
            Stage::Raw => "raw",
            Stage::Processed => "processed",
            Stage::Plans => "plans",
            Stage::Generated => "generated",
        }
    }
}

/// Dated JSON snapshots under `data_dir/<stage>/<name>_<date>.json`.
/// Writing the same stage twice on one date overwrites the earlier file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
    date: NaiveDate,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            root: root.into(),
            date,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, stage: Stage, name: &str) -> PathBuf {
        self.root
            .join(stage.dir_name())
            .join(format!("{}_{}.json", name, self.date.format("%Y-%m-%d")))
    }

    pub fn save<T: Serialize + ?Sized>(
        &self,
        stage: Stage,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, CoreError> {
        let path = self.path_for(stage, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;
        info!("Saved {} snapshot: {}", stage.dir_name(), path.display());
        Ok(path)
    }

    pub fn load<T: DeserializeOwned>(&self, stage: Stage, name: &str) -> Result<T, CoreError> {
        let path = self.path_for(stage, name);
        if !path.exists() {
            return Err(SourceError::SnapshotNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        debug!("Loading snapshot {}", path.display());
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
