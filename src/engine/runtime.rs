use std::path::{Path, PathBuf};

use crate::browser::page::PageDriver;
use crate::engine::plugins::PluginRegistry;
use crate::engine::recorder::StepRecorder;

/// How long a validation keeps re-checking when its `options` carry no
/// `timeout`.
pub const DEFAULT_EXPECT_TIMEOUT_MS: u64 = 5_000;

/// Settings fixed for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Origin that relative navigation paths are joined to
    pub base_url: Option<String>,

    /// Base for relative upload paths
    pub working_dir: PathBuf,

    /// Retry window for validations without their own `timeout`
    pub expect_timeout_ms: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            working_dir: PathBuf::new(),
            expect_timeout_ms: DEFAULT_EXPECT_TIMEOUT_MS,
        }
    }
}

impl RunSettings {
    /// Join a navigation path to the base URL. Absolute URLs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.contains("://") {
            return path.to_string();
        }
        match self.base_url.as_deref() {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

/// Everything one scenario's steps execute against.
pub struct Runtime<'a> {
    pub page: &'a mut dyn PageDriver,
    pub plugins: &'a PluginRegistry,
    pub settings: &'a RunSettings,
    pub recorder: &'a mut StepRecorder,
}
