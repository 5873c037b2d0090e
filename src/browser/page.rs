use std::path::PathBuf;

use serde_json::Value;

use crate::browser::error::BrowserError;
use crate::browser::locator::Locator;

// ============================================================================
// PageDriver trait: the live page as seen by the step engine
// ============================================================================

/// Browser page capability consumed by the engine.
///
/// `options` arguments are the scenario's `actionOptions` / `expectOptions`,
/// passed through untouched (timeouts, force flags, ...). Implementations
/// report a locator that matches nothing as [`BrowserError::NoMatch`].
pub trait PageDriver {
    fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    fn wait_for_timeout(&mut self, ms: u64) -> Result<(), BrowserError>;

    fn title(&mut self, options: &Value) -> Result<String, BrowserError>;

    fn url(&mut self, options: &Value) -> Result<String, BrowserError>;

    /// Full serialized HTML of the current document.
    fn content(&mut self) -> Result<String, BrowserError>;

    /// Evaluate a function expression in the page with one JSON argument.
    fn evaluate(&mut self, script: &str, arg: &Value) -> Result<Value, BrowserError>;

    /// Evaluate a function expression with the locator's element as first
    /// argument and `arg` as second.
    fn evaluate_on(&mut self, locator: &Locator, script: &str, arg: &Value)
    -> Result<Value, BrowserError>;

    fn count(&mut self, locator: &Locator) -> Result<usize, BrowserError>;

    fn click(&mut self, locator: &Locator, options: &Value) -> Result<(), BrowserError>;

    fn hover(&mut self, locator: &Locator, options: &Value) -> Result<(), BrowserError>;

    fn fill(&mut self, locator: &Locator, value: &str, options: &Value)
    -> Result<(), BrowserError>;

    /// Character-by-character input.
    fn type_text(&mut self, locator: &Locator, text: &str, options: &Value)
    -> Result<(), BrowserError>;

    fn press(&mut self, locator: &Locator, key: &str, options: &Value)
    -> Result<(), BrowserError>;

    /// Replace the file selection of a file input. An empty slice clears it.
    fn set_files(&mut self, locator: &Locator, files: &[FilePayload], options: &Value)
    -> Result<(), BrowserError>;

    fn is_visible(&mut self, locator: &Locator, options: &Value) -> Result<bool, BrowserError>;

    /// Whether the element is a native input, textarea or content-editable.
    fn is_fillable(&mut self, locator: &Locator, options: &Value) -> Result<bool, BrowserError>;

    fn text_content(&mut self, locator: &Locator, options: &Value) -> Result<String, BrowserError>;

    fn input_value(&mut self, locator: &Locator, options: &Value) -> Result<String, BrowserError>;

    fn attribute(&mut self, locator: &Locator, name: &str, options: &Value)
    -> Result<Option<String>, BrowserError>;

    fn computed_style(&mut self, locator: &Locator, property: &str, options: &Value)
    -> Result<String, BrowserError>;
}

/// One file handed to a file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePayload {
    /// A file on disk
    Path(PathBuf),

    /// In-memory content with its reported file name and MIME type
    Buffer {
        name: String,
        mime_type: String,
        contents: Vec<u8>,
    },
}
