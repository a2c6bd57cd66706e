//! Command-line configuration and log setup. The terminal belongs to the UI
//! while the app runs, so logs go to a file instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use directories::BaseDirs;
use tracing_subscriber::EnvFilter;

use crate::report::DEFAULT_REPORT_PATH;

/// Folder name used beneath the user's home directory for the log file.
const DATA_DIR_NAME: &str = ".library-desk";
const LOG_FILE_NAME: &str = "library-desk.log";

/// Command-line options.
#[derive(Parser, Debug)]
#[command(
    name = "library-desk",
    about = "Record library books, issue and return them, and write a summary report",
    version
)]
pub struct Cli {
    /// Where generated reports are written (overwritten each time)
    #[arg(long = "report", value_name = "PATH", default_value = DEFAULT_REPORT_PATH)]
    pub report_path: PathBuf,

    /// Minimum level written to the log file
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log file location [default: ~/.library-desk/library-desk.log]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// Resolve the log file, falling back to the per-user data directory.
    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => {
                let base_dirs =
                    BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
                Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME))
            }
        }
    }
}

/// Install the global `tracing` subscriber writing plain text to the log file.
/// Returns the path in use so the caller can mention it.
pub fn initialize_tracing(cli: &Cli) -> Result<PathBuf> {
    let log_path = cli.log_path()?;
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_level.to_filter_directive()))
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))?;

    Ok(log_path)
}
