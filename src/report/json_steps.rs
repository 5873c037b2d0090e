use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::engine::recorder::{StepRecord, StepSink, now_ms};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepsFile<'a> {
    title: &'a str,
    start_time: u64,
    steps: &'a [StepRecord],
}

/// Mirrors a scenario's step records to
/// `<dir>/<safe-title>-<startMillis>.json`, rewriting the file on every
/// step begin and end.
pub struct JsonStepsWriter {
    title: String,
    start_time: u64,
    path: PathBuf,
}

impl JsonStepsWriter {
    pub fn new(dir: &Path, title: &str) -> Self {
        let start_time = now_ms();
        let path = dir.join(format!("{}-{}.json", safe_name(title), start_time));
        Self {
            title: title.to_string(),
            start_time,
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StepSink for JsonStepsWriter {
    fn flush(&mut self, records: &[StepRecord]) {
        let file = StepsFile {
            title: &self.title,
            start_time: self.start_time,
            steps: records,
        };
        let json = match serde_json::to_string_pretty(&file) {
            Ok(j) => j,
            Err(e) => {
                warn!("failed to serialize step records: {}", e);
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(dir = %parent.display(), "could not create report directory: {}", e);
                return;
            }
        }
        if let Err(e) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), "failed to write step records: {}", e);
        }
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn safe_name(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() { "scenario".to_string() } else { name }
}
