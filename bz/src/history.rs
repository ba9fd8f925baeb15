//! Local chart history
//!
//! A single JSON file holding the newest records first. Every mutation
//! rewrites the whole file; there is no index.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chart::Chart;
use crate::input::BirthData;

/// Records kept when no limit is configured
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Unique identifier for a history record
pub type RecordId = String;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to access history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("History file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("No history record with id {0}")]
    NotFound(RecordId),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// One saved chart with the inputs that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: RecordId,
    /// User-facing name, e.g. whose chart this is
    pub label: String,
    /// Creation timestamp (unix ms)
    pub timestamp: i64,
    pub birth: BirthData,
    pub chart: Chart,
    /// Opaque interpretation attached by a downstream consumer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<serde_json::Value>,
}

impl HistoryRecord {
    /// New record stamped with a fresh id and the current time
    pub fn new(label: impl Into<String>, birth: BirthData, chart: Chart) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            label: label.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            birth,
            chart,
            analysis: None,
        }
    }

    pub fn with_analysis(mut self, analysis: serde_json::Value) -> Self {
        self.analysis = Some(analysis);
        self
    }
}

/// File-backed list of the most recent charts
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
}

impl HistoryStore {
    /// A limit of 0 is raised to 1 so a save is never discarded outright
    pub fn new(path: impl AsRef<Path>, limit: usize) -> Self {
        if limit == 0 {
            warn!("History limit of 0 would discard every save, keeping 1 record");
        }
        Self {
            path: path.as_ref().to_path_buf(),
            limit: limit.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// All records, newest first; a missing file is an empty history
    pub fn list(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| HistoryError::Io {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| HistoryError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Prepend a record, dropping the oldest beyond the limit
    pub fn save(&self, record: HistoryRecord) -> Result<()> {
        let mut records = self.list()?;
        records.retain(|r| r.id != record.id);
        let id = record.id.clone();
        records.insert(0, record);
        records.truncate(self.limit);
        self.write(&records)?;
        info!(id = %id, count = records.len(), "Saved chart to history");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<HistoryRecord> {
        self.list()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))
    }

    /// Remove one record and return what remains
    pub fn delete(&self, id: &str) -> Result<Vec<HistoryRecord>> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(HistoryError::NotFound(id.to_string()));
        }
        self.write(&records)?;
        info!(id, remaining = records.len(), "Deleted history record");
        Ok(records)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| HistoryError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        info!(path = %self.path.display(), "Cleared history");
        Ok(())
    }

    fn write(&self, records: &[HistoryRecord]) -> Result<()> {
        let io_err = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, content).map_err(io_err)?;
        debug!(path = %self.path.display(), count = records.len(), "Wrote history file");
        Ok(())
    }
}
