use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("search API quota limit reached")]
    QuotaExceeded,

    #[error("search API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode search response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SearchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, SearchError::Network(_) | SearchError::Status { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API configuration at {path}; run `lead-extractor` once to set it up")]
    Missing { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is malformed ({source}); fix it or delete it to re-run setup")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {path} is missing a value for `{field}`")]
    Incomplete { path: PathBuf, field: &'static str },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write spreadsheet {path}: {source}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to write history log: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize history log: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("input closed before `{0}` was answered")]
    Closed(String),
}

/// Failure during first-run setup: either the file or the prompt.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),
}
