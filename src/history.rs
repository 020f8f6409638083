use crate::error::HistoryError;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Summary of one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub area: String,
    pub timestamp: String,
    pub count: usize,
    #[serde(rename = "files")]
    pub output_file_paths: Vec<String>,
}

/// Append-only run log stored as a JSON array.
///
/// Each append reads and rewrites the whole file; two processes appending at
/// the same time can lose an entry.
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Existing entries. A missing, unreadable or corrupt log counts as empty.
    pub fn load(&self) -> Vec<HistoryEntry> {
        if !self.path.exists() {
            return Vec::new();
        }

        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to open history file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };
        let mut content = String::new();
        if let Err(e) = file.read_to_string(&mut content) {
            error!("Failed to read history file {:?}: {}", self.path, e);
            return Vec::new();
        }

        match serde_json::from_str::<Vec<HistoryEntry>>(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("History file {:?} is corrupt ({}). Starting a new log.", self.path, e);
                Vec::new()
            }
        }
    }

    pub fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.load();
        entries.push(entry);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)?;

        info!("History updated: {} runs in {:?}", entries.len(), self.path);
        Ok(())
    }
}
