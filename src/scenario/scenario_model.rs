use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::browser::locator::Locator;
use crate::engine::error::StepError;
use crate::engine::selector::{SelectorKind, Target};
use crate::scenario::error::ScenarioError;

// ============================================================================
// Typed model: what the engine executes
// ============================================================================

/// A loaded, validated scenario. Read-only for the duration of a run.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub description: String,
    pub enabled: bool,
    pub steps: Vec<Step>,
}

/// One declarative instruction.
#[derive(Debug, Clone)]
pub struct Step {
    /// Label for logs and step records
    pub name: String,

    pub action: Action,

    /// Element to operate on; `None` means the page itself
    pub target: Option<Target>,

    /// Force the Nth match instead of the first (or the iteration index)
    pub nth: Option<usize>,

    /// Pause after the action
    pub wait_ms: Option<u64>,

    /// Fan out over every match of this step's own selector
    pub iterate: bool,

    /// Membership in a contiguous cross-step iteration group
    pub group: Option<String>,

    pub validations: Vec<Validation>,

    /// Passed through to the page primitive
    pub options: Value,
}

impl Step {
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            action,
            target: None,
            nth: None,
            wait_ms: None,
            iterate: false,
            group: None,
            validations: Vec::new(),
            options: Value::Null,
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_nth(mut self, nth: usize) -> Self {
        self.nth = Some(nth);
        self
    }

    pub fn with_wait(mut self, ms: u64) -> Self {
        self.wait_ms = Some(ms);
        self
    }

    pub fn iterating(mut self) -> Self {
        self.iterate = true;
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validations.push(validation);
        self
    }

    /// The step's selector as a live query, without any index applied.
    pub fn base_locator(&self) -> Option<Locator> {
        self.target.as_ref().map(Target::locator)
    }

    /// The step's selector with its explicit index applied.
    pub fn locator(&self) -> Option<Locator> {
        self.base_locator().map(|l| l.maybe_nth(self.nth))
    }
}

/// Built-in action vocabulary plus the `custom` escape hatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate { path: String },
    Fill { value: String },
    Type { text: String },
    Click,
    Hover,
    PressKey { key: String },
    Wait { ms: u64 },
    Upload(Upload),
    Custom { name: String, data: Value },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Navigate { .. } => "navigate",
            Action::Fill { .. } => "fill",
            Action::Type { .. } => "type",
            Action::Click => "click",
            Action::Hover => "hover",
            Action::PressKey { .. } => "pressKey",
            Action::Wait { .. } => "wait",
            Action::Upload(_) => "upload",
            Action::Custom { .. } => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub sources: Vec<FileSource>,
    pub clear_first: bool,
    /// Resolve relative paths against the working directory
    pub resolve_from_base: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Embedded {
        name: String,
        mime_type: String,
        contents: Vec<u8>,
    },
}

/// One declarative assertion.
#[derive(Debug, Clone)]
pub struct Validation {
    pub check: Check,
    pub target: Option<Target>,
    pub nth: Option<usize>,
    /// Record the failure and keep going instead of aborting the step
    pub soft: bool,
    pub message: Option<String>,
    /// Passed through to the page primitive
    pub options: Value,
}

impl Validation {
    pub fn new(check: Check) -> Self {
        Self {
            check,
            target: None,
            nth: None,
            soft: false,
            message: None,
            options: Value::Null,
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_nth(mut self, nth: usize) -> Self {
        self.nth = Some(nth);
        self
    }

    pub fn soft(mut self) -> Self {
        self.soft = true;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone)]
pub enum Check {
    Visible,
    Hidden,
    HasTitle(String),
    /// Matched against the page URL
    HasUrl(Regex),
    /// Whitespace-normalized equality
    HasText(String),
    ContainsText(String),
    HasValue(String),
    HasAttribute {
        name: String,
        expected: Option<String>,
    },
    HasCss {
        property: String,
        expected: String,
    },
    /// Matched against the `class` attribute
    HasClass(Regex),
    Custom {
        name: String,
        data: Value,
    },
    /// A type this version does not know; logged and passed
    Unsupported(String),
}

impl Check {
    pub fn name(&self) -> &str {
        match self {
            Check::Visible => "visible",
            Check::Hidden => "hidden",
            Check::HasTitle(_) => "hasTitle",
            Check::HasUrl(_) => "hasURL",
            Check::HasText(_) => "hasText",
            Check::ContainsText(_) => "containsText",
            Check::HasValue(_) => "hasValue",
            Check::HasAttribute { .. } => "hasAttribute",
            Check::HasCss { .. } => "hasCSS",
            Check::HasClass(_) => "hasClass",
            Check::Custom { .. } => "custom",
            Check::Unsupported(name) => name,
        }
    }
}

// ============================================================================
// Scenario documents: the JSON shape on disk
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDocument {
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, alias = "steps")]
    pub test_steps: Vec<StepDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDocument {
    #[serde(default, alias = "name")]
    pub step_name: String,
    pub action: String,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default, alias = "selectorKind")]
    pub selector_type: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, alias = "waitTimeMs")]
    pub wait_time: Option<u64>,
    #[serde(default, alias = "explicitIndex", alias = "index")]
    pub nth: Option<usize>,
    #[serde(default)]
    pub iterate: bool,
    #[serde(default, alias = "iterativeGroupId")]
    pub iterative_group: Option<String>,
    #[serde(default)]
    pub validations: Vec<ValidationDocument>,
    #[serde(default)]
    pub custom_name: Option<String>,
    #[serde(default, alias = "actionOptions")]
    pub options: Option<Value>,
    #[serde(default)]
    pub resolve_from_base: Option<bool>,
    #[serde(default)]
    pub clear_first: bool,
    #[serde(default)]
    pub files: Option<Vec<FileDocument>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDocument {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default, alias = "selectorKind")]
    pub selector_type: Option<String>,
    #[serde(default, alias = "explicitIndex", alias = "index")]
    pub nth: Option<usize>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub soft: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "attributeName")]
    pub attribute: Option<String>,
    #[serde(default, alias = "cssPropertyName")]
    pub css_property: Option<String>,
    #[serde(default)]
    pub custom_name: Option<String>,
    #[serde(default, alias = "expectOptions")]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDocument {
    #[serde(default)]
    pub path: Option<String>,
    /// base64
    #[serde(default, alias = "embeddedContent")]
    pub content: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

// ============================================================================
// Document -> typed model conversion (load-time validation)
// ============================================================================

impl Scenario {
    pub fn from_document(doc: ScenarioDocument) -> Result<Self, ScenarioError> {
        let description = doc.description;
        let mut steps = Vec::with_capacity(doc.test_steps.len());
        for (index, step_doc) in doc.test_steps.into_iter().enumerate() {
            let step_name = step_doc.step_name.clone();
            let step = Step::try_from(step_doc).map_err(|source| ScenarioError::InvalidStep {
                scenario: description.clone(),
                index,
                step: step_name,
                source,
            })?;
            steps.push(step);
        }
        Ok(Scenario {
            description,
            enabled: doc.enabled,
            steps,
        })
    }
}

impl TryFrom<StepDocument> for Step {
    type Error = StepError;

    fn try_from(doc: StepDocument) -> Result<Self, Self::Error> {
        let name = doc.step_name;
        let target = parse_target(doc.selector, doc.selector_type.as_deref())?;
        let group = doc.iterative_group.filter(|g| !g.is_empty());

        if doc.iterate && group.is_some() {
            return Err(StepError::ConflictingIteration(name));
        }
        if doc.iterate && target.is_none() {
            return Err(StepError::missing("selector", format!("Iterating step '{}'", name)));
        }

        let context = |action: &str| format!("Action '{}'", action);
        let mut wait_ms = doc.wait_time;
        let action = match doc.action.as_str() {
            "navigate" | "goto" => Action::Navigate {
                path: doc
                    .path
                    .or_else(|| data_string(&doc.data))
                    .unwrap_or_else(|| "/".into()),
            },
            "fill" => Action::Fill {
                value: data_string(&doc.data).ok_or_else(|| StepError::missing("data", context("fill")))?,
            },
            "type" => Action::Type {
                text: data_string(&doc.data).ok_or_else(|| StepError::missing("data", context("type")))?,
            },
            "click" => Action::Click,
            "hover" => Action::Hover,
            "pressKey" | "press" => Action::PressKey {
                key: data_string(&doc.data)
                    .ok_or_else(|| StepError::missing("data", context("pressKey")))?,
            },
            "wait" | "waitForTimeout" => {
                let ms = wait_ms
                    .take()
                    .or_else(|| doc.data.as_ref().and_then(Value::as_u64))
                    .ok_or_else(|| StepError::missing("waitTime", context("wait")))?;
                Action::Wait { ms }
            }
            "upload" | "setInputFiles" => Action::Upload(build_upload(
                &name,
                doc.files,
                doc.data,
                doc.clear_first,
                doc.resolve_from_base.unwrap_or(true),
            )?),
            "custom" => Action::Custom {
                name: doc
                    .custom_name
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| StepError::missing("customName", context("custom")))?,
                data: doc.data.unwrap_or(Value::Null),
            },
            other => return Err(StepError::UnsupportedAction(other.to_string())),
        };

        let validations = doc
            .validations
            .into_iter()
            .map(Validation::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Step {
            name,
            action,
            target,
            nth: doc.nth,
            wait_ms,
            iterate: doc.iterate,
            group,
            validations,
            options: doc.options.unwrap_or(Value::Null),
        })
    }
}

impl TryFrom<ValidationDocument> for Validation {
    type Error = StepError;

    fn try_from(doc: ValidationDocument) -> Result<Self, Self::Error> {
        let context = format!("Validation type '{}'", doc.kind);
        let expected = || data_string(&doc.data).ok_or_else(|| StepError::missing("data", context.clone()));

        let check = match doc.kind.as_str() {
            "visible" | "toBeVisible" => Check::Visible,
            "hidden" | "toBeHidden" => Check::Hidden,
            "hasTitle" | "toHaveTitle" => Check::HasTitle(expected()?),
            "hasURL" | "hasUrl" | "toHaveURL" => Check::HasUrl(compile_pattern(&expected()?)?),
            "hasText" | "toHaveText" => Check::HasText(expected()?),
            "containsText" | "toContainText" => Check::ContainsText(expected()?),
            "hasValue" | "toHaveValue" => Check::HasValue(expected()?),
            "hasAttribute" | "toHaveAttribute" => Check::HasAttribute {
                name: doc
                    .attribute
                    .clone()
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| StepError::missing("attribute", context.clone()))?,
                expected: data_string(&doc.data),
            },
            "hasCSS" | "hasCss" | "toHaveCSS" => Check::HasCss {
                property: doc
                    .css_property
                    .clone()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| StepError::missing("cssProperty", context.clone()))?,
                expected: expected()?,
            },
            "hasClass" | "toHaveClass" => Check::HasClass(compile_pattern(&expected()?)?),
            "custom" => Check::Custom {
                name: doc
                    .custom_name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| StepError::missing("customName", context.clone()))?,
                data: doc.data.clone().unwrap_or(Value::Null),
            },
            other => Check::Unsupported(other.to_string()),
        };

        Ok(Validation {
            check,
            target: parse_target(doc.selector, doc.selector_type.as_deref())?,
            nth: doc.nth,
            soft: doc.soft,
            message: doc.message,
            options: doc.options.unwrap_or(Value::Null),
        })
    }
}

fn parse_target(selector: Option<String>, kind: Option<&str>) -> Result<Option<Target>, StepError> {
    // An unknown kind is rejected even when no selector accompanies it.
    let kind: SelectorKind = match kind {
        Some(k) => k.parse()?,
        None => SelectorKind::Css,
    };
    Ok(selector
        .filter(|s| !s.is_empty())
        .map(|s| Target::new(s, kind)))
}

/// Scalar `data` as a string; objects, arrays and null are not.
fn data_string(data: &Option<Value>) -> Option<String> {
    match data {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

pub fn compile_pattern(pattern: &str) -> Result<Regex, StepError> {
    Regex::new(pattern).map_err(|e| StepError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn build_upload(
    step: &str,
    files: Option<Vec<FileDocument>>,
    data: Option<Value>,
    clear_first: bool,
    resolve_from_base: bool,
) -> Result<Upload, StepError> {
    let mut sources = Vec::new();

    match files.filter(|f| !f.is_empty()) {
        Some(files) => {
            for file in files {
                sources.push(file_source(file)?);
            }
        }
        None => match data {
            Some(Value::String(path)) => sources.push(FileSource::Path(path.into())),
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    let path = item
                        .as_str()
                        .filter(|p| !p.is_empty())
                        .ok_or_else(|| StepError::missing("path", format!("Upload data entry {}", index)))?;
                    sources.push(FileSource::Path(path.into()));
                }
            }
            _ => {}
        },
    }

    if sources.is_empty() {
        return Err(StepError::NoFilesProvided(step.to_string()));
    }

    Ok(Upload {
        sources,
        clear_first,
        resolve_from_base,
    })
}

fn file_source(file: FileDocument) -> Result<FileSource, StepError> {
    if let Some(content) = file.content {
        let name = file
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| StepError::missing("name", "Embedded upload file"))?;
        let contents = STANDARD
            .decode(content.trim())
            .map_err(|e| StepError::InvalidFileContent {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        return Ok(FileSource::Embedded {
            name,
            mime_type: file
                .mime_type
                .unwrap_or_else(|| "application/octet-stream".into()),
            contents,
        });
    }

    file.path
        .filter(|p| !p.is_empty())
        .map(|p| FileSource::Path(p.into()))
        .ok_or_else(|| StepError::missing("path", "Upload file entry"))
}
