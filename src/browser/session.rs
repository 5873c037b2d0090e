use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::error::BrowserError;
use crate::browser::locator::Locator;
use crate::browser::page::{FilePayload, PageDriver};

/// How to start the page bridge process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Node.js executable
    pub node: String,

    /// Bridge script that owns the Playwright page
    pub script: String,

    pub headless: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            node: "node".into(),
            script: "node/page_server.js".into(),
            headless: true,
        }
    }
}

/// Request sent to the bridge over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest<'a> {
    Goto {
        url: &'a str,
    },
    Wait {
        ms: u64,
    },
    Title {
        options: &'a Value,
    },
    Url {
        options: &'a Value,
    },
    Content,
    Evaluate {
        script: &'a str,
        arg: &'a Value,
    },
    EvaluateOn {
        locator: &'a Locator,
        script: &'a str,
        arg: &'a Value,
    },
    Count {
        locator: &'a Locator,
    },
    Click {
        locator: &'a Locator,
        options: &'a Value,
    },
    Hover {
        locator: &'a Locator,
        options: &'a Value,
    },
    Fill {
        locator: &'a Locator,
        value: &'a str,
        options: &'a Value,
    },
    Type {
        locator: &'a Locator,
        text: &'a str,
        options: &'a Value,
    },
    Press {
        locator: &'a Locator,
        key: &'a str,
        options: &'a Value,
    },
    SetFiles {
        locator: &'a Locator,
        files: Vec<WireFile>,
        options: &'a Value,
    },
    IsVisible {
        locator: &'a Locator,
        options: &'a Value,
    },
    IsFillable {
        locator: &'a Locator,
        options: &'a Value,
    },
    Text {
        locator: &'a Locator,
        options: &'a Value,
    },
    InputValue {
        locator: &'a Locator,
        options: &'a Value,
    },
    Attribute {
        locator: &'a Locator,
        name: &'a str,
        options: &'a Value,
    },
    ComputedStyle {
        locator: &'a Locator,
        property: &'a str,
        options: &'a Value,
    },
    Quit,
}

/// File entry as Playwright's `setInputFiles` expects it.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WireFile {
    Path(String),
    #[serde(rename_all = "camelCase")]
    Buffer {
        name: String,
        mime_type: String,
        /// base64
        buffer: String,
    },
}

impl From<&FilePayload> for WireFile {
    fn from(file: &FilePayload) -> Self {
        match file {
            FilePayload::Path(path) => WireFile::Path(path.display().to_string()),
            FilePayload::Buffer {
                name,
                mime_type,
                contents,
            } => WireFile::Buffer {
                name: name.clone(),
                mime_type: mime_type.clone(),
                buffer: STANDARD.encode(contents),
            },
        }
    }
}

/// Response received from the bridge over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Machine-readable failure kind, e.g. "no_match"
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// A persistent page backed by a Node.js Playwright bridge.
///
/// The bridge keeps one browser page open. Commands are NDJSON on stdin,
/// answers NDJSON on stdout; the first line it prints is the ready signal.
pub struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    closed: bool,
}

impl BrowserSession {
    /// Spawn the bridge and wait for its ready signal.
    pub fn launch(config: &BridgeConfig) -> Result<Self, BrowserError> {
        let mut command = Command::new(&config.node);
        command.arg(&config.script);
        if config.headless {
            command.arg("--headless");
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| BrowserError::Spawn {
                script: config.script.clone(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            BrowserError::SessionIO(format!("Failed to capture stdin of {}", config.script))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            BrowserError::SessionIO(format!("Failed to capture stdout of {}", config.script))
        })?;

        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| BrowserError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| BrowserError::Json {
                context: "bridge ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(BrowserError::Protocol {
                command: "launch".into(),
                error: format!("Did not receive ready signal from {}", config.script),
            });
        }

        debug!(script = %config.script, headless = config.headless, "page bridge ready");

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            closed: false,
        })
    }

    fn send(&mut self, request: &BrowserRequest<'_>) -> Result<BrowserResponse, BrowserError> {
        let json = serde_json::to_string(request).map_err(|e| BrowserError::Json {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json)
            .map_err(|e| BrowserError::SessionIO(format!("Failed to write to bridge: {}", e)))?;
        self.stdin
            .flush()
            .map_err(|e| BrowserError::SessionIO(format!("Failed to flush bridge stdin: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| BrowserError::SessionIO(format!("Failed to read from bridge: {}", e)))?;

        if line.trim().is_empty() {
            return Err(BrowserError::SessionIO(
                "Empty response from bridge (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| BrowserError::Json {
            context: "bridge response".into(),
            source: e,
        })
    }

    /// Send a request, verify it succeeded and return its value.
    fn call(&mut self, request: &BrowserRequest<'_>, command: &str) -> Result<Value, BrowserError> {
        let response = self.send(request)?;
        if response.ok {
            return Ok(response.value.unwrap_or(Value::Null));
        }
        let error = response.error.unwrap_or_else(|| "Unknown error".into());
        match (response.code.as_deref(), locator_of(request)) {
            (Some("no_match"), Some(locator)) => Err(BrowserError::NoMatch {
                selector: locator.to_string(),
            }),
            _ => Err(BrowserError::Protocol {
                command: command.into(),
                error,
            }),
        }
    }

    fn call_string(&mut self, request: &BrowserRequest<'_>, command: &str) -> Result<String, BrowserError> {
        match self.call(request, command)? {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => Ok(other.to_string()),
        }
    }

    fn call_bool(&mut self, request: &BrowserRequest<'_>, command: &str) -> Result<bool, BrowserError> {
        Ok(self.call(request, command)?.as_bool().unwrap_or(false))
    }

    /// Close the page and wait for the bridge to exit.
    pub fn quit(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // The bridge may already be gone; exit status is all that matters here.
        if let Err(e) = self.send(&BrowserRequest::Quit) {
            warn!("bridge quit request failed: {}", e);
        }
        self.child
            .wait()
            .map_err(|e| BrowserError::SessionIO(format!("Failed to wait for bridge: {}", e)))?;
        Ok(())
    }
}

fn locator_of<'a>(request: &BrowserRequest<'a>) -> Option<&'a Locator> {
    match request {
        BrowserRequest::EvaluateOn { locator, .. }
        | BrowserRequest::Count { locator }
        | BrowserRequest::Click { locator, .. }
        | BrowserRequest::Hover { locator, .. }
        | BrowserRequest::Fill { locator, .. }
        | BrowserRequest::Type { locator, .. }
        | BrowserRequest::Press { locator, .. }
        | BrowserRequest::SetFiles { locator, .. }
        | BrowserRequest::IsVisible { locator, .. }
        | BrowserRequest::IsFillable { locator, .. }
        | BrowserRequest::Text { locator, .. }
        | BrowserRequest::InputValue { locator, .. }
        | BrowserRequest::Attribute { locator, .. }
        | BrowserRequest::ComputedStyle { locator, .. } => Some(*locator),
        _ => None,
    }
}

impl PageDriver for BrowserSession {
    fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.call(&BrowserRequest::Goto { url }, "goto")?;
        Ok(())
    }

    fn wait_for_timeout(&mut self, ms: u64) -> Result<(), BrowserError> {
        self.call(&BrowserRequest::Wait { ms }, "wait")?;
        Ok(())
    }

    fn title(&mut self, options: &Value) -> Result<String, BrowserError> {
        self.call_string(&BrowserRequest::Title { options }, "title")
    }

    fn url(&mut self, options: &Value) -> Result<String, BrowserError> {
        self.call_string(&BrowserRequest::Url { options }, "url")
    }

    fn content(&mut self) -> Result<String, BrowserError> {
        self.call_string(&BrowserRequest::Content, "content")
    }

    fn evaluate(&mut self, script: &str, arg: &Value) -> Result<Value, BrowserError> {
        self.call(&BrowserRequest::Evaluate { script, arg }, "evaluate")
    }

    fn evaluate_on(
        &mut self,
        locator: &Locator,
        script: &str,
        arg: &Value,
    ) -> Result<Value, BrowserError> {
        self.call(
            &BrowserRequest::EvaluateOn {
                locator,
                script,
                arg,
            },
            "evaluate_on",
        )
    }

    fn count(&mut self, locator: &Locator) -> Result<usize, BrowserError> {
        let value = self.call(&BrowserRequest::Count { locator }, "count")?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    fn click(&mut self, locator: &Locator, options: &Value) -> Result<(), BrowserError> {
        self.call(&BrowserRequest::Click { locator, options }, "click")?;
        Ok(())
    }

    fn hover(&mut self, locator: &Locator, options: &Value) -> Result<(), BrowserError> {
        self.call(&BrowserRequest::Hover { locator, options }, "hover")?;
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, value: &str, options: &Value) -> Result<(), BrowserError> {
        self.call(
            &BrowserRequest::Fill {
                locator,
                value,
                options,
            },
            "fill",
        )?;
        Ok(())
    }

    fn type_text(
        &mut self,
        locator: &Locator,
        text: &str,
        options: &Value,
    ) -> Result<(), BrowserError> {
        self.call(
            &BrowserRequest::Type {
                locator,
                text,
                options,
            },
            "type",
        )?;
        Ok(())
    }

    fn press(&mut self, locator: &Locator, key: &str, options: &Value) -> Result<(), BrowserError> {
        self.call(
            &BrowserRequest::Press {
                locator,
                key,
                options,
            },
            "press",
        )?;
        Ok(())
    }

    fn set_files(
        &mut self,
        locator: &Locator,
        files: &[FilePayload],
        options: &Value,
    ) -> Result<(), BrowserError> {
        let files = files.iter().map(WireFile::from).collect();
        self.call(
            &BrowserRequest::SetFiles {
                locator,
                files,
                options,
            },
            "set_files",
        )?;
        Ok(())
    }

    fn is_visible(&mut self, locator: &Locator, options: &Value) -> Result<bool, BrowserError> {
        self.call_bool(&BrowserRequest::IsVisible { locator, options }, "is_visible")
    }

    fn is_fillable(&mut self, locator: &Locator, options: &Value) -> Result<bool, BrowserError> {
        self.call_bool(&BrowserRequest::IsFillable { locator, options }, "is_fillable")
    }

    fn text_content(&mut self, locator: &Locator, options: &Value) -> Result<String, BrowserError> {
        self.call_string(&BrowserRequest::Text { locator, options }, "text")
    }

    fn input_value(&mut self, locator: &Locator, options: &Value) -> Result<String, BrowserError> {
        self.call_string(&BrowserRequest::InputValue { locator, options }, "input_value")
    }

    fn attribute(
        &mut self,
        locator: &Locator,
        name: &str,
        options: &Value,
    ) -> Result<Option<String>, BrowserError> {
        let value = self.call(
            &BrowserRequest::Attribute {
                locator,
                name,
                options,
            },
            "attribute",
        )?;
        Ok(value.as_str().map(str::to_string))
    }

    fn computed_style(
        &mut self,
        locator: &Locator,
        property: &str,
        options: &Value,
    ) -> Result<String, BrowserError> {
        self.call_string(
            &BrowserRequest::ComputedStyle {
                locator,
                property,
                options,
            },
            "computed_style",
        )
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!("bridge shutdown failed: {}", e);
        }
    }
}
