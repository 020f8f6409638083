//! End-to-end run: mock search API -> collection loop -> spreadsheet, CSV
//! and history log on disk.

use std::fs;
use std::time::Duration;

use calamine::{open_workbook, Reader, Xlsx};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lead_extractor_lib::job_manager::execute;
use lead_extractor_lib::{
    AppPaths, CollectorSettings, HistoryLog, LeadRequest, SearchConfig, SearchEngine,
    SearchSettings, StopSignal,
};

fn paths_in(dir: &TempDir) -> AppPaths {
    AppPaths {
        config_file: dir.path().join("google_search_config.json"),
        history_file: dir.path().join("search_history.json"),
        output_dir: dir.path().join("extracted_leads"),
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

fn first_page() -> Mock {
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("start", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "link": "https://www.linkedin.com/in/jane-roe",
                    "title": "Jane Roe - Realtor - HomeSmart | LinkedIn",
                    "snippet": "Phoenix realtor. jane.roe@gmail.com (602) 555-0142"
                },
                {
                    "link": "https://www.linkedin.com/in/jane-roe",
                    "title": "Jane Roe - Realtor | LinkedIn",
                    "snippet": "Another listing, write jroe@gmail.com"
                },
                {
                    "link": "https://www.linkedin.com/in/sam-park",
                    "title": "Sam Park - Broker",
                    "snippet": "No contact details"
                },
                {
                    "link": "https://www.linkedin.com/in/lee-chen",
                    "title": "Lee Chen - Agent",
                    "snippet": "Reach me at lee.chen@gmail.com"
                }
            ]
        })))
}

fn empty_second_page() -> Mock {
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("start", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
}

fn engine_for(uri: &str) -> SearchEngine {
    let config = SearchConfig {
        api_key: "k".into(),
        search_engine_id: "cx".into(),
    };
    let settings = SearchSettings {
        endpoint: format!("{}/customsearch/v1", uri),
        max_attempts: 1,
        retry_delay: Duration::ZERO,
        timeout: Duration::from_secs(5),
    };
    SearchEngine::with_settings(config, settings).expect("search engine")
}

#[tokio::test(flavor = "multi_thread")]
async fn run_writes_spreadsheet_csv_and_history() {
    let server = MockServer::start().await;
    first_page().expect(1).mount(&server).await;
    empty_second_page().expect(1).mount(&server).await;

    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let uri = server.uri();
    let worker_paths = paths.clone();

    let summary = tokio::task::spawn_blocking(move || {
        let engine = engine_for(&uri);
        execute(
            &engine,
            &request(10),
            &CollectorSettings::without_pacing(),
            &worker_paths,
            &StopSignal::new(),
            |_| {},
        )
    })
    .await
    .expect("worker panicked");

    assert_eq!(summary.collected, 2);
    let files = summary.files.expect("files saved");

    let mut workbook: Xlsx<_> = open_workbook(&files.spreadsheet).expect("open spreadsheet");
    let range = workbook.worksheet_range("Leads").expect("Leads sheet");
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    assert_eq!(
        rows,
        vec![
            vec!["Name", "Email", "Phone", "LinkedIn"],
            vec![
                "Jane Roe",
                "jane.roe@gmail.com",
                "(602) 555-0142",
                "https://www.linkedin.com/in/jane-roe",
            ],
            vec![
                "Lee Chen",
                "lee.chen@gmail.com",
                "N/A",
                "https://www.linkedin.com/in/lee-chen",
            ],
        ]
    );

    let csv = fs::read_to_string(&files.delimited).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Name,Email,Phone,LinkedIn"));
    assert_eq!(
        lines.next(),
        Some("Jane Roe,jane.roe@gmail.com,(602) 555-0142,https://www.linkedin.com/in/jane-roe")
    );
    assert_eq!(lines.count(), 1);

    let history = HistoryLog::new(&paths.history_file).load();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, "real estate");
    assert_eq!(history[0].count, 2);
    assert_eq!(history[0].timestamp, files.timestamp);
    assert_eq!(history[0].output_file_paths.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_runs_extend_history() {
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    fs::write(&paths.history_file, "corrupt").unwrap();

    for _ in 0..2 {
        // A target of one is met on the first page, so the second is never requested.
        let server = MockServer::start().await;
        first_page().expect(1).mount(&server).await;
        let uri = server.uri();
        let worker_paths = paths.clone();

        tokio::task::spawn_blocking(move || {
            execute(
                &engine_for(&uri),
                &request(1),
                &CollectorSettings::without_pacing(),
                &worker_paths,
                &StopSignal::new(),
                |_| {},
            )
        })
        .await
        .expect("worker panicked");
    }

    let history = HistoryLog::new(&paths.history_file).load();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|entry| entry.count == 1));
}
