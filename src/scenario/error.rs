use std::path::PathBuf;

use thiserror::Error;

use crate::engine::error::StepError;

/// Failures while reading scenario documents. All of them are raised before
/// any browser is launched.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Scenario '{scenario}', step {index} ('{step}'): {source}")]
    InvalidStep {
        scenario: String,
        index: usize,
        step: String,
        #[source]
        source: StepError,
    },

    #[error("{origin}: {source}")]
    InFile {
        origin: String,
        #[source]
        source: Box<ScenarioError>,
    },

    #[error("Invalid grep pattern '{pattern}': {reason}")]
    InvalidFilter { pattern: String, reason: String },
}
