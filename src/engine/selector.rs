use std::fmt;
use std::str::FromStr;

use crate::browser::locator::Locator;
use crate::engine::error::StepError;

/// Query strategy named by a step's `selectorType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorKind {
    #[default]
    Css,
    Xpath,
    Id,
    Text,
    TestId,
}

impl FromStr for SelectorKind {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "css" => Ok(SelectorKind::Css),
            "xpath" => Ok(SelectorKind::Xpath),
            "id" => Ok(SelectorKind::Id),
            "text" => Ok(SelectorKind::Text),
            "testId" => Ok(SelectorKind::TestId),
            other => Err(StepError::UnsupportedSelectorKind(other.to_string())),
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectorKind::Css => "css",
            SelectorKind::Xpath => "xpath",
            SelectorKind::Id => "id",
            SelectorKind::Text => "text",
            SelectorKind::TestId => "testId",
        };
        f.write_str(name)
    }
}

/// A selector as written in a scenario, with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub selector: String,
    pub kind: SelectorKind,
}

impl Target {
    pub fn new(selector: impl Into<String>, kind: SelectorKind) -> Self {
        Self {
            selector: selector.into(),
            kind,
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(selector, SelectorKind::Css)
    }

    /// Parse `selectorType` (defaulting to css) and pair it with `selector`.
    pub fn parse(selector: &str, kind: Option<&str>) -> Result<Self, StepError> {
        let kind = match kind {
            Some(k) => k.parse()?,
            None => SelectorKind::Css,
        };
        Ok(Self::new(selector, kind))
    }

    pub fn locator(&self) -> Locator {
        resolve(&self.selector, self.kind)
    }
}

/// Build the live query for `selector` under the given strategy.
pub fn resolve(selector: &str, kind: SelectorKind) -> Locator {
    let engine_selector = match kind {
        SelectorKind::Css => selector.to_string(),
        SelectorKind::Xpath => format!("xpath={}", selector),
        SelectorKind::Id => format!("#{}", selector),
        SelectorKind::Text => format!("text={}", selector),
        SelectorKind::TestId => format!("[data-testid=\"{}\"]", selector.replace('"', "\\\"")),
    };
    Locator::new(engine_selector)
}

/// Resolve a raw `(selector, selectorType)` pair in one go.
pub fn resolve_str(selector: &str, kind: &str) -> Result<Locator, StepError> {
    Ok(resolve(selector, kind.parse()?))
}
