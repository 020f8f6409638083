use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

fn base_builder(default_level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, default_level);

    if let Ok(spec) = env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder
}

/// Logs to stderr at `default_level` unless `RUST_LOG` says otherwise.
pub fn init(default_level: LevelFilter) {
    if base_builder(default_level).try_init().is_ok() {
        log::info!("Logger initialized.");
    }
}

/// Logs to `path` (appending) so terminal UIs keep the screen to themselves.
pub fn init_to_file(path: &Path, default_level: LevelFilter) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut builder = base_builder(default_level);
    builder.target(Target::Pipe(Box::new(file)));
    if builder.try_init().is_ok() {
        log::info!("Logger initialized, writing to {:?}.", path);
    }
    Ok(())
}
