use serde_json::{Value, json};
use tracing::debug;

use crate::browser::locator::Locator;
use crate::browser::page::PageDriver;
use crate::engine::error::StepError;
use crate::scenario::context::ExecutionContext;
use crate::scenario::scenario_model::{Action, Check, Step, Validation};

pub const SELECT_WORD: &str = "selectWord";
pub const TEXT_NODES: &str = "textNodes";

static NULL: Value = Value::Null;

/// `(root, { word, nth }) => bool`: selects the nth occurrence of `word` in
/// the text nodes under `root`.
const SELECT_WORD_JS: &str = r#"(root, { word, nth }) => {
  const walker = document.createTreeWalker(root, NodeFilter.SHOW_TEXT);
  let seen = 0;
  for (let node = walker.nextNode(); node; node = walker.nextNode()) {
    let from = 0;
    for (;;) {
      const at = node.textContent.indexOf(word, from);
      if (at === -1) break;
      if (seen === nth) {
        const range = document.createRange();
        range.setStart(node, at);
        range.setEnd(node, at + word.length);
        const selection = window.getSelection();
        selection.removeAllRanges();
        selection.addRange(range);
        return true;
      }
      seen += 1;
      from = at + word.length;
    }
  }
  return false;
}"#;

/// `(el, excluded) => string[]`: trimmed, non-empty text nodes under `el`,
/// skipping any subtree whose tag is in `excluded`.
const TEXT_NODES_JS: &str = r#"(el, excluded) => {
  const skip = excluded.map((t) => t.toUpperCase());
  const collect = (node) => {
    const out = [];
    for (const child of node.childNodes) {
      if (child.nodeType === Node.TEXT_NODE) {
        const text = child.textContent.trim();
        if (text) out.push(text);
      } else if (child.nodeType === Node.ELEMENT_NODE && !skip.includes(child.tagName)) {
        out.push(...collect(child));
      }
    }
    return out;
  };
  return collect(el);
}"#;

/// Custom action `selectWord`.
///
/// `data` is the word itself, or `{ "word": ..., "nth": 0 }`. Searches the
/// step's element when it has one, the whole body otherwise.
pub fn select_word(
    page: &mut dyn PageDriver,
    step: &Step,
    _ctx: &ExecutionContext,
    element: Option<&Locator>,
) -> Result<(), StepError> {
    let data = match &step.action {
        Action::Custom { data, .. } => data,
        _ => &NULL,
    };
    let (word, nth) = match data {
        Value::String(word) => (word.clone(), 0),
        Value::Object(map) => (
            map.get("word")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            map.get("nth").and_then(Value::as_u64).unwrap_or(0),
        ),
        _ => (String::new(), 0),
    };
    if word.is_empty() {
        return Err(StepError::missing("word", format!("Custom action '{}'", SELECT_WORD)));
    }

    debug!(step = %step.name, %word, nth, "selecting word");
    let arg = json!({ "word": word, "nth": nth });
    let found = match element {
        Some(locator) => page.evaluate_on(locator, SELECT_WORD_JS, &arg)?,
        None => page.evaluate(
            &format!("(arg) => ({})(document.body, arg)", SELECT_WORD_JS),
            &arg,
        )?,
    };

    if found.as_bool().unwrap_or(false) {
        Ok(())
    } else {
        Err(StepError::AssertionFailed(format!(
            "occurrence {} of word '{}' not found",
            nth, word
        )))
    }
}

/// Custom validation `textNodes`.
///
/// `data` is the expected list, or `{ "expected": [...], "excludedTags":
/// [...] }`. Requires an element.
pub fn text_nodes(
    page: &mut dyn PageDriver,
    validation: &Validation,
    _ctx: &ExecutionContext,
    element: Option<&Locator>,
) -> Result<(), StepError> {
    let data = match &validation.check {
        Check::Custom { data, .. } => data,
        _ => &NULL,
    };
    let (expected, excluded) = match data {
        Value::Array(_) => (strings(data), Vec::new()),
        Value::Object(map) => (
            map.get("expected").map(strings).unwrap_or_default(),
            map.get("excludedTags").map(strings).unwrap_or_default(),
        ),
        _ => {
            return Err(StepError::missing(
                "data",
                format!("Custom validation '{}'", TEXT_NODES),
            ));
        }
    };

    let element = element.ok_or_else(|| StepError::MissingLocator {
        step: TEXT_NODES.to_string(),
        reason: "validation needs an element".into(),
    })?;

    let actual = strings(&page.evaluate_on(element, TEXT_NODES_JS, &json!(excluded))?);
    if actual == expected {
        Ok(())
    } else {
        Err(StepError::AssertionFailed(format!(
            "expected text nodes {:?} in '{}', got {:?}",
            expected, element, actual
        )))
    }
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
