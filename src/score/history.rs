//! Score history persistence.
//!
//! Recorded scores live in `.doc-gate/history.jsonl` at the project root,
//! one JSON object per line. Append-only: the file is never rewritten, so
//! concurrent runs at worst interleave whole lines.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ConfidenceScore;

/// State directory at the project root.
pub const STATE_DIR: &str = ".doc-gate";
/// History file name inside the state directory.
pub const HISTORY_FILE: &str = "history.jsonl";

/// One recorded score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the score was recorded.
    pub timestamp: DateTime<Utc>,
    /// Overall score at that time.
    pub overall: f64,
    /// Code-health sub-score.
    pub code_health: f64,
    /// Knowledge-health sub-score.
    pub knowledge_health: f64,
}

impl HistoryEntry {
    /// Snapshot of a computed score at the current time.
    pub fn from_score(score: &ConfidenceScore) -> Self {
        Self {
            timestamp: Utc::now(),
            overall: score.overall,
            code_health: score.code_health,
            knowledge_health: score.knowledge_health,
        }
    }
}

/// Handle on the project's score history file.
pub struct ScoreHistory {
    path: PathBuf,
}

impl ScoreHistory {
    /// History handle for a project root. Nothing is touched on disk until
    /// the first append.
    pub fn new(project_root: &Path) -> Self {
        Self {
            path: project_root.join(STATE_DIR).join(HISTORY_FILE),
        }
    }

    /// Appends one entry as a single line.
    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory {}", dir.display()))?;
        }
        let line = format!("{}\n", serde_json::to_string(entry)?);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open history file {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        Ok(())
    }

    /// Loads all entries in recorded order, skipping malformed lines.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read history file {}", self.path.display())
                })
            }
        };

        let mut entries = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("skipping malformed history line: {e}"),
            }
        }
        Ok(entries)
    }

    /// The most recently recorded entry, if any.
    pub fn last(&self) -> Result<Option<HistoryEntry>> {
        Ok(self.load()?.pop())
    }
}
