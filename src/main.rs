use lead_extractor_lib::{config, input_loader, job_manager, logger};
use lead_extractor_lib::{AppPaths, CollectorSettings, JobEvent, SearchEngine, StopSignal};

use log::{error, info, LevelFilter};
use std::error::Error;
use std::process;

const LOGO: &str = r"
  _                                 _ _
 (_)                               (_) |
  _ _ __ ______ ___ _ __ ___   __ _ _| |___
 | | '_ \______/ _ \ '_ ` _ \ / _` | | / __|
 | | | | |    |  __/ | | | | | (_| | | \__ \
 |_|_| |_|     \___|_| |_| |_|\__,_|_|_|___/
";

fn main() {
    // User-facing output goes to stdout; the log only carries warnings
    // unless RUST_LOG asks for more.
    logger::init(LevelFilter::Warn);
    println!("{}", LOGO);

    if let Err(e) = run() {
        let message = failure_message(e.as_ref());
        error!("{}", message);
        eprintln!("{}", message);
        process::exit(1);
    }
}

/// One readable line for the operator, built from the error's `Display`.
fn failure_message(e: &dyn Error) -> String {
    format!("Error: {}", e)
}

fn run() -> Result<(), Box<dyn Error>> {
    let paths = AppPaths::from_env();
    let mut prompter = input_loader::stdin_prompter();

    let search_config = config::load_or_create_config(&paths.config_file, &mut prompter)
        .map_err(|e| format!("Configuration error: {}", e))?;

    println!("--- LinkedIn Lead Extractor ---");
    let request = input_loader::read_lead_request(&mut prompter)?;
    let engine = SearchEngine::new(search_config)?;

    println!("\nSearching Google with query: {}\n", request.search_query());
    info!("Running extraction for {:?}", request);

    // Nothing raises the signal from a line prompt; Ctrl-C ends the process.
    let stop = StopSignal::new();
    let summary = job_manager::execute(
        &engine,
        &request,
        &CollectorSettings::default(),
        &paths,
        &stop,
        |event| {
            if let JobEvent::Log(line) = event {
                println!("{}", line);
            }
        },
    );

    if let Some(err) = summary.save_error {
        return Err(format!(
            "could not save {} collected contacts: {}",
            summary.collected, err
        )
        .into());
    }
    Ok(())
}
