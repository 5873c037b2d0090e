use thiserror::Error;

/// Failures raised by the page boundary itself (bridge process, protocol,
/// or a locator that resolved to nothing).
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Bridge process failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    Spawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the bridge process failed
    #[error("Session I/O error: {0}")]
    SessionIO(String),

    /// JSON encoding or decoding of a bridge message failed
    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The bridge answered with ok=false
    #[error("{command} failed: {error}")]
    Protocol { command: String, error: String },

    /// The locator matched no element on the page
    #[error("No element matches '{selector}'")]
    NoMatch { selector: String },
}
