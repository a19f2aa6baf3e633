use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Conventional location of the processed summaries, relative to a project root
const DATA_SUBDIR: &str = "data/processed";

/// Pick the data directory: explicit path, else `./data/processed`, else
/// `data/processed` next to the executable or up to two levels above it.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }

    let cwd_candidate = PathBuf::from(DATA_SUBDIR);
    if cwd_candidate.is_dir() {
        return cwd_candidate;
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| find_near(&exe))
        .unwrap_or(cwd_candidate)
}

fn find_near(exe: &Path) -> Option<PathBuf> {
    exe.ancestors()
        .skip(1)
        .take(3)
        .map(|dir| dir.join(DATA_SUBDIR))
        .find(|candidate| candidate.is_dir())
}

/// The terminal belongs to the TUI, so logs only go to a file.
/// Without a file logging is off, whatever RUST_LOG says.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let file = match log_file {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?,
        ),
        None => None,
    };
    log_builder(file).init();
    Ok(())
}

fn log_builder(file: Option<File>) -> Builder {
    match file {
        Some(file) => {
            let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
            builder.target(Target::Pipe(Box::new(file)));
            builder
        }
        None => {
            let mut builder = Builder::new();
            builder.filter_level(LevelFilter::Off);
            builder
        }
    }
}
