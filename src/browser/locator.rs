use std::fmt;

use serde::Serialize;

/// A live element query: selector, optional index and optional parent scope.
///
/// A `Locator` never holds element handles. Every page operation that takes
/// one re-evaluates the query against the DOM as it is at that moment, so a
/// count read before an action and an element touched after it may disagree.
/// Element operations on a locator without an index act on the first match;
/// counting a locator that carries an index yields 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
    /// Engine selector, already prefixed for its query strategy
    pub selector: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nth: Option<usize>,

    /// Scope the query to descendants of this locator's target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Locator>>,
}

impl Locator {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            nth: None,
            parent: None,
        }
    }

    /// Same query narrowed to the `index`-th match (replaces any prior index).
    pub fn nth(&self, index: usize) -> Self {
        Self {
            nth: Some(index),
            ..self.clone()
        }
    }

    /// Apply `index` when present, otherwise return the query unchanged.
    pub fn maybe_nth(&self, index: Option<usize>) -> Self {
        match index {
            Some(i) => self.nth(i),
            None => self.clone(),
        }
    }

    /// Query for `selector` among the descendants of this locator's target.
    pub fn locate(&self, selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            nth: None,
            parent: Some(Box::new(self.clone())),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{} >> ", parent)?;
        }
        write!(f, "{}", self.selector)?;
        if let Some(n) = self.nth {
            write!(f, " >> nth={}", n)?;
        }
        Ok(())
    }
}
