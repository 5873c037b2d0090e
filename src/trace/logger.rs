use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Per-run log output: stderr plus an appended daily file
/// `<log_dir>/run-YYYY-MM-DD.log`.
///
/// Installed as the thread's default subscriber while the value lives, so
/// nothing process-wide is touched.
pub struct RunLogger {
    path: Option<PathBuf>,
    guard: Option<DefaultGuard>,
}

impl RunLogger {
    /// `RUST_LOG` wins over `verbose` (0 = info, 1 = debug, 2+ = trace).
    /// A log file that cannot be opened leaves only the stderr layer.
    pub fn open(log_dir: &Path, verbose: u8) -> Self {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));

        let path = log_dir.join(log_file_name(chrono::Local::now().date_naive()));
        let file_layer = match open_append(&path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            ),
            Err(e) => {
                eprintln!("Warning: could not open log file '{}': {}", path.display(), e);
                None
            }
        };
        let path = file_layer.as_ref().map(|_| path);

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(file_layer);

        Self {
            path,
            guard: Some(tracing::subscriber::set_default(subscriber)),
        }
    }

    /// The log file in use, if one could be opened.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Uninstall the subscriber. Dropping the logger does the same.
    pub fn close(mut self) {
        self.guard.take();
    }
}

/// `run-YYYY-MM-DD.log`
pub fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("run-{}.log", date.format("%Y-%m-%d"))
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
