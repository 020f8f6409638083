pub mod collector;
pub mod config;
pub mod delay_manager;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod history;
pub mod input_loader;
pub mod job_manager;
pub mod logger;
pub mod search_engine;

// Exporting types for convenience
pub use collector::{Collector, CollectorEvent, CollectorSettings, Lead, StopSignal};
pub use config::{AppPaths, SearchConfig};
pub use exporter::{Exporter, SavedFiles};
pub use extractor::{extract_emails, extract_phones};
pub use history::{HistoryEntry, HistoryLog};
pub use input_loader::LeadRequest;
pub use job_manager::{JobEvent, JobHandle, JobManager, JobSummary};
pub use search_engine::{ResultItem, SearchEngine, SearchProvider, SearchSettings};
