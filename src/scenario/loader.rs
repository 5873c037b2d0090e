use std::path::{Path, PathBuf};

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::scenario::error::ScenarioError;
use crate::scenario::scenario_model::{Scenario, ScenarioDocument};

/// Where scenario documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioSource {
    /// One document or an array of documents as a JSON string
    Inline(String),

    /// A single document file, or a directory of `*.json` documents
    Path(PathBuf),
}

impl ScenarioSource {
    /// Pick the source: inline JSON wins over a single file, which wins over
    /// the default path.
    pub fn select(inline: Option<String>, file: Option<PathBuf>, default: &Path) -> Self {
        match (inline, file) {
            (Some(json), _) => ScenarioSource::Inline(json),
            (None, Some(file)) => ScenarioSource::Path(file),
            (None, None) => ScenarioSource::Path(default.to_path_buf()),
        }
    }

    pub fn load(&self) -> Result<Vec<Scenario>, ScenarioError> {
        match self {
            ScenarioSource::Inline(json) => load_inline(json),
            ScenarioSource::Path(path) => load_path(path),
        }
    }
}

/// Load enabled scenarios from a file or a directory.
pub fn load_path(path: &Path) -> Result<Vec<Scenario>, ScenarioError> {
    let metadata = std::fs::metadata(path).map_err(|e| ScenarioError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if metadata.is_dir() {
        load_dir(path)
    } else {
        load_file(path)
    }
}

/// Load every `*.json` document in `dir`, in file-name order.
pub fn load_dir(dir: &Path) -> Result<Vec<Scenario>, ScenarioError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ScenarioError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ScenarioError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let p = entry.path();
        if p.is_file() && p.extension().is_some_and(|e| e == "json") {
            files.push(p);
        }
    }
    files.sort();

    let mut scenarios = Vec::new();
    for file in &files {
        scenarios.extend(load_file(file)?);
    }
    info!(dir = %dir.display(), files = files.len(), scenarios = scenarios.len(), "loaded scenarios");
    Ok(scenarios)
}

pub fn load_file(path: &Path) -> Result<Vec<Scenario>, ScenarioError> {
    let content = std::fs::read_to_string(path).map_err(|e| ScenarioError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_str(&content, &path.display().to_string())
}

pub fn load_inline(json: &str) -> Result<Vec<Scenario>, ScenarioError> {
    load_str(json, "inline scenarios")
}

fn load_str(text: &str, origin: &str) -> Result<Vec<Scenario>, ScenarioError> {
    let parse_error = |source| ScenarioError::Parse {
        origin: origin.to_string(),
        source,
    };

    let value: Value = serde_json::from_str(text).map_err(parse_error)?;
    let documents: Vec<ScenarioDocument> = match value {
        Value::Array(_) => serde_json::from_value(value).map_err(parse_error)?,
        other => vec![serde_json::from_value(other).map_err(parse_error)?],
    };

    let mut scenarios = Vec::new();
    for doc in documents {
        if !doc.enabled {
            debug!(scenario = %doc.description, "skipping disabled scenario");
            continue;
        }
        let scenario = Scenario::from_document(doc).map_err(|e| ScenarioError::InFile {
            origin: origin.to_string(),
            source: Box::new(e),
        })?;
        scenarios.push(scenario);
    }
    Ok(scenarios)
}

/// Keep scenarios whose description matches the `grep` regular expression.
pub fn filter(scenarios: Vec<Scenario>, grep: Option<&str>) -> Result<Vec<Scenario>, ScenarioError> {
    let Some(pattern) = grep else {
        return Ok(scenarios);
    };
    let re = Regex::new(pattern).map_err(|e| ScenarioError::InvalidFilter {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    Ok(scenarios
        .into_iter()
        .filter(|s| re.is_match(&s.description))
        .collect())
}
