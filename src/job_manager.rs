//! One extraction run from request to saved files, either on the caller's
//! thread ([`execute`]) or on a background worker ([`JobManager::start_job`])
//! that reports back over a channel.

use crate::collector::{Collector, CollectorEvent, CollectorSettings, Lead, StopSignal};
use crate::config::{load_config, AppPaths};
use crate::exporter::{Exporter, SavedFiles};
use crate::history::{HistoryEntry, HistoryLog};
use crate::input_loader::LeadRequest;
use crate::search_engine::{SearchEngine, SearchProvider, SearchSettings};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, info, warn};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Log(String),
    LeadFound(Lead),
    Finished(JobSummary),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub collected: usize,
    pub target: usize,
    pub stopped: bool,
    pub files: Option<SavedFiles>,
    pub save_error: Option<String>,
}

/// Runs the collection loop for `request`, saves what it found and records
/// the run in the history log. Progress goes to `emit`.
pub fn execute<P, F>(
    provider: &P,
    request: &LeadRequest,
    settings: &CollectorSettings,
    paths: &AppPaths,
    stop: &StopSignal,
    mut emit: F,
) -> JobSummary
where
    P: SearchProvider,
    F: FnMut(JobEvent),
{
    let query = request.search_query();
    emit(JobEvent::Log("Starting extraction...".to_string()));
    emit(JobEvent::Log(format!("   Query: {}", query)));

    let collector = Collector::with_settings(provider, settings.clone());
    let leads = collector.collect(&query, request.target_count, stop, |event| {
        let line = event.to_string();
        match event {
            CollectorEvent::Searching { .. } => emit(JobEvent::Log(format!("\n{}", line))),
            CollectorEvent::LeadFound(lead) => {
                emit(JobEvent::Log(line));
                emit(JobEvent::LeadFound(lead));
            }
            CollectorEvent::Finished { .. } => {}
            _ => emit(JobEvent::Log(line)),
        }
    });

    let mut summary = JobSummary {
        collected: leads.len(),
        target: request.target_count,
        stopped: stop.is_stopped(),
        files: None,
        save_error: None,
    };

    if leads.is_empty() {
        emit(JobEvent::Log(
            "\nNo data was collected. Try a broader search (e.g., different title or area)."
                .to_string(),
        ));
        emit(JobEvent::Finished(summary.clone()));
        return summary;
    }

    let exporter = Exporter::new(&paths.output_dir);
    match exporter.save(&leads, &request.title, &request.area) {
        Ok(files) => {
            emit(JobEvent::Log(format!("\nSuccess! Saved {} contacts:", leads.len())));
            emit(JobEvent::Log(format!("   - Excel file: {}", files.spreadsheet.display())));
            emit(JobEvent::Log(format!("   - CSV file:   {}", files.delimited.display())));

            let history = HistoryLog::new(&paths.history_file);
            let entry = HistoryEntry {
                title: request.title.clone(),
                area: request.area.clone(),
                timestamp: files.timestamp.clone(),
                count: leads.len(),
                output_file_paths: files.paths(),
            };
            if let Err(e) = history.append(entry) {
                warn!("Could not update history: {}", e);
                emit(JobEvent::Log(format!("Warning: could not update history log: {}", e)));
            }
            summary.files = Some(files);
        }
        Err(e) => {
            error!("Saving leads failed: {}", e);
            emit(JobEvent::Log(format!("Error saving files: {}", e)));
            summary.save_error = Some(e.to_string());
        }
    }

    emit(JobEvent::Finished(summary.clone()));
    summary
}

/// Handle on a background run. Dropping it leaves the worker running.
pub struct JobHandle {
    events: Receiver<JobEvent>,
    stop: StopSignal,
    thread: JoinHandle<()>,
}

impl JobHandle {
    /// Asks the worker to stop at the next item or page boundary.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_stopping(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn events(&self) -> &Receiver<JobEvent> {
        &self.events
    }

    /// Everything the worker has sent so far, without blocking.
    pub fn drain(&self) -> Vec<JobEvent> {
        self.events.try_iter().collect()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn join(self) -> Vec<JobEvent> {
        if self.thread.join().is_err() {
            error!("Extraction worker panicked");
        }
        self.events.try_iter().collect()
    }
}

pub struct JobManager {
    paths: AppPaths,
    search_settings: SearchSettings,
    collector_settings: CollectorSettings,
}

impl JobManager {
    pub fn new(paths: AppPaths) -> Self {
        JobManager {
            paths,
            search_settings: SearchSettings::default(),
            collector_settings: CollectorSettings::without_pacing(),
        }
    }

    pub fn with_settings(
        paths: AppPaths,
        search_settings: SearchSettings,
        collector_settings: CollectorSettings,
    ) -> Self {
        JobManager {
            paths,
            search_settings,
            collector_settings,
        }
    }

    /// Spawns a worker thread for `request` and returns immediately.
    pub fn start_job(&self, request: LeadRequest) -> JobHandle {
        let (tx, rx) = unbounded();
        let stop = StopSignal::new();

        let paths = self.paths.clone();
        let search_settings = self.search_settings.clone();
        let collector_settings = self.collector_settings.clone();
        let worker_stop = stop.clone();

        info!("Starting extraction job for {:?}", request);
        let thread = thread::spawn(move || {
            run_job(request, paths, search_settings, collector_settings, worker_stop, tx);
        });

        JobHandle {
            events: rx,
            stop,
            thread,
        }
    }
}

fn run_job(
    request: LeadRequest,
    paths: AppPaths,
    search_settings: SearchSettings,
    collector_settings: CollectorSettings,
    stop: StopSignal,
    tx: Sender<JobEvent>,
) {
    // The receiver may be gone if the UI quit; nothing left to report to.
    let send = |event: JobEvent| {
        let _ = tx.send(event);
    };

    let config = match load_config(&paths.config_file) {
        Ok(c) => c,
        Err(e) => {
            error!("Config error: {}", e);
            send(JobEvent::Failed(format!("Error loading config: {}", e)));
            return;
        }
    };

    let engine = match SearchEngine::with_settings(config, search_settings) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Could not build search client: {}", e);
            send(JobEvent::Failed(format!("Could not start the search client: {}", e)));
            return;
        }
    };

    execute(&engine, &request, &collector_settings, &paths, &stop, send);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_engine::ResultItem;
    use tempfile::TempDir;

    struct OnePage(Vec<ResultItem>);

    impl SearchProvider for OnePage {
        fn search(&self, _query: &str, start: u32) -> Vec<ResultItem> {
            if start == 1 {
                self.0.clone()
            } else {
                Vec::new()
            }
        }
    }

    fn paths_in(dir: &TempDir) -> AppPaths {
        AppPaths {
            config_file: dir.path().join("config.json"),
            history_file: dir.path().join("history.json"),
            output_dir: dir.path().join("leads"),
        }
    }

    fn request(target: usize) -> LeadRequest {
        LeadRequest {
            title: "real estate".into(),
            area: "Phoenix".into(),
            target_count: target,
            email_provider: "gmail.com".into(),
        }
    }

    fn item(link: &str, snippet: &str) -> ResultItem {
        ResultItem {
            link: link.into(),
            title: "Pat Lee - Realtor".into(),
            snippet: snippet.into(),
        }
    }

    #[test]
    fn execute_saves_files_and_history() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let provider = OnePage(vec![
            item("https://linkedin.com/in/a", "pat@gmail.com"),
            item("https://linkedin.com/in/b", "no email here"),
        ]);
        let mut events = Vec::new();

        let summary = execute(
            &provider,
            &request(5),
            &CollectorSettings::without_pacing(),
            &paths,
            &StopSignal::new(),
            |e| events.push(e),
        );

        assert_eq!(summary.collected, 1);
        assert!(!summary.stopped);
        let files = summary.files.clone().unwrap();
        assert!(files.spreadsheet.exists());
        assert!(files.delimited.exists());
        let file_name = files.delimited.file_name().unwrap().to_string_lossy();
        assert!(file_name.starts_with("real_estate_Phoenix_"));

        let history = HistoryLog::new(&paths.history_file).load();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].count, 1);
        assert_eq!(history[0].output_file_paths, files.paths());

        assert_eq!(events.iter().filter(|e| matches!(e, JobEvent::LeadFound(_))).count(), 1);
        assert_eq!(events.last(), Some(&JobEvent::Finished(summary)));
    }

    #[test]
    fn execute_without_leads_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let paths = paths_in(&dir);
        let provider = OnePage(vec![item("https://linkedin.com/in/a", "nothing")]);

        let summary = execute(
            &provider,
            &request(5),
            &CollectorSettings::without_pacing(),
            &paths,
            &StopSignal::new(),
            |_| {},
        );

        assert_eq!(summary.collected, 0);
        assert!(summary.files.is_none());
        assert!(!paths.output_dir.exists());
        assert!(!paths.history_file.exists());
    }

    #[test]
    fn failed_save_skips_history() {
        let dir = TempDir::new().unwrap();
        let mut paths = paths_in(&dir);
        paths.output_dir = dir.path().join("blocked");
        std::fs::write(&paths.output_dir, "a file").unwrap();
        let provider = OnePage(vec![item("https://linkedin.com/in/a", "pat@gmail.com")]);

        let summary = execute(
            &provider,
            &request(1),
            &CollectorSettings::without_pacing(),
            &paths,
            &StopSignal::new(),
            |_| {},
        );

        assert_eq!(summary.collected, 1);
        assert!(summary.files.is_none());
        assert!(summary.save_error.is_some());
        assert!(!paths.history_file.exists());
    }

    #[test]
    fn worker_reports_missing_config() {
        let dir = TempDir::new().unwrap();
        let manager = JobManager::new(paths_in(&dir));

        let handle = manager.start_job(request(3));
        let events = handle.join();

        assert_eq!(events.len(), 1);
        match &events[0] {
            JobEvent::Failed(msg) => assert!(msg.contains("Error loading config")),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
