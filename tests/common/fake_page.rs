use std::collections::HashMap;

use serde_json::Value;
use ui_scenario_runner::browser::error::BrowserError;
use ui_scenario_runner::browser::locator::Locator;
use ui_scenario_runner::browser::page::{FilePayload, PageDriver};

/// What clicking an element does to the fake DOM.
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// Detach the clicked element
    Remove,
    /// Change the page URL
    Navigate(String),
    /// Make the element with this id visible
    Show(String),
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub id: String,
    /// Engine selectors this element answers to
    pub selectors: Vec<String>,
    pub parent: Option<String>,
    pub text: String,
    pub value: String,
    pub visible: bool,
    pub fillable: bool,
    pub attributes: HashMap<String, String>,
    pub styles: HashMap<String, String>,
    pub files: Vec<FilePayload>,
    pub on_click: Vec<ClickEffect>,
    /// Text reads so far, and the text the element switches to once that
    /// many reads have happened
    pub text_reads: usize,
    pub later_text: Option<(usize, String)>,
}

impl FakeElement {
    pub fn new(id: &str, selector: &str) -> Self {
        Self {
            id: id.to_string(),
            selectors: vec![selector.to_string()],
            visible: true,
            ..Self::default()
        }
    }

    pub fn also(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }

    pub fn child_of(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn fillable(mut self) -> Self {
        self.fillable = true;
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click.push(effect);
        self
    }

    /// Render `text` from the read after the first `reads` ones.
    pub fn text_after(mut self, reads: usize, text: &str) -> Self {
        self.later_text = Some((reads, text.to_string()));
        self
    }
}

/// In-memory page: an element table queried live on every call, plus a log
/// of every call made.
#[derive(Debug, Default)]
pub struct FakePage {
    pub url: String,
    pub title: String,
    pub elements: Vec<FakeElement>,
    pub calls: Vec<String>,
    /// Returned by `evaluate` / `evaluate_on`
    pub eval_result: Value,
    pub url_reads: usize,
    /// URL committed once `url_reads` reaches the count
    pub later_url: Option<(usize, String)>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            url: "about:blank".into(),
            ..Self::default()
        }
    }

    pub fn with(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Report `url` from the read after the first `reads` ones.
    pub fn url_after_reads(mut self, reads: usize, url: &str) -> Self {
        self.later_url = Some((reads, url.to_string()));
        self
    }

    pub fn element(&self, id: &str) -> Option<&FakeElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Calls whose log line starts with `prefix`.
    pub fn calls_starting(&self, prefix: &str) -> Vec<String> {
        self.calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Indices of the elements `locator` matches right now.
    fn matches(&self, locator: &Locator) -> Vec<usize> {
        let scope: Option<Vec<String>> = locator.parent.as_ref().map(|parent| {
            self.matches(parent)
                .into_iter()
                .map(|i| self.elements[i].id.clone())
                .collect()
        });

        let all: Vec<usize> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.selectors.iter().any(|s| *s == locator.selector))
            .filter(|(_, e)| match &scope {
                Some(ids) => e.parent.as_ref().is_some_and(|p| ids.contains(p)),
                None => true,
            })
            .map(|(i, _)| i)
            .collect();

        match locator.nth {
            Some(n) => all.get(n).map(|i| vec![*i]).unwrap_or_default(),
            None => all,
        }
    }

    fn first(&self, locator: &Locator) -> Result<usize, BrowserError> {
        self.matches(locator)
            .first()
            .copied()
            .ok_or_else(|| BrowserError::NoMatch {
                selector: locator.to_string(),
            })
    }

    fn apply(&mut self, index: usize) {
        let effects = self.elements[index].on_click.clone();
        for effect in effects {
            match effect {
                ClickEffect::Remove => {
                    let id = self.elements[index].id.clone();
                    self.elements.retain(|e| e.id != id);
                    return;
                }
                ClickEffect::Navigate(url) => self.url = url,
                ClickEffect::Show(id) => {
                    if let Some(e) = self.elements.iter_mut().find(|e| e.id == id) {
                        e.visible = true;
                    }
                }
            }
        }
    }
}

impl PageDriver for FakePage {
    fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.calls.push(format!("goto {}", url));
        self.url = url.to_string();
        Ok(())
    }

    fn wait_for_timeout(&mut self, ms: u64) -> Result<(), BrowserError> {
        self.calls.push(format!("wait {}", ms));
        Ok(())
    }

    fn title(&mut self, _options: &Value) -> Result<String, BrowserError> {
        Ok(self.title.clone())
    }

    fn url(&mut self, _options: &Value) -> Result<String, BrowserError> {
        if let Some((reads, url)) = &self.later_url {
            if self.url_reads >= *reads {
                self.url = url.clone();
                self.later_url = None;
            }
        }
        self.url_reads += 1;
        Ok(self.url.clone())
    }

    fn content(&mut self) -> Result<String, BrowserError> {
        Ok(self
            .elements
            .iter()
            .map(|e| e.text.clone())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn evaluate(&mut self, _script: &str, arg: &Value) -> Result<Value, BrowserError> {
        self.calls.push(format!("evaluate {}", arg));
        Ok(self.eval_result.clone())
    }

    fn evaluate_on(&mut self, locator: &Locator, _script: &str, arg: &Value) -> Result<Value, BrowserError> {
        self.first(locator)?;
        self.calls.push(format!("evaluate_on {} {}", locator, arg));
        Ok(self.eval_result.clone())
    }

    fn count(&mut self, locator: &Locator) -> Result<usize, BrowserError> {
        let n = self.matches(locator).len();
        self.calls.push(format!("count {} = {}", locator, n));
        Ok(n)
    }

    fn click(&mut self, locator: &Locator, _options: &Value) -> Result<(), BrowserError> {
        let index = self.first(locator)?;
        self.calls.push(format!("click {}", locator));
        self.apply(index);
        Ok(())
    }

    fn hover(&mut self, locator: &Locator, _options: &Value) -> Result<(), BrowserError> {
        self.first(locator)?;
        self.calls.push(format!("hover {}", locator));
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, value: &str, _options: &Value) -> Result<(), BrowserError> {
        let index = self.first(locator)?;
        if !self.elements[index].fillable {
            return Err(BrowserError::Protocol {
                command: "fill".into(),
                error: format!("{} is not an input", locator),
            });
        }
        self.calls.push(format!("fill {} = {}", locator, value));
        self.elements[index].value = value.to_string();
        Ok(())
    }

    fn type_text(&mut self, locator: &Locator, text: &str, _options: &Value) -> Result<(), BrowserError> {
        let index = self.first(locator)?;
        self.calls.push(format!("type {} = {}", locator, text));
        self.elements[index].value.push_str(text);
        Ok(())
    }

    fn press(&mut self, locator: &Locator, key: &str, _options: &Value) -> Result<(), BrowserError> {
        self.first(locator)?;
        self.calls.push(format!("press {} {}", locator, key));
        Ok(())
    }

    fn set_files(&mut self, locator: &Locator, files: &[FilePayload], _options: &Value) -> Result<(), BrowserError> {
        let index = self.first(locator)?;
        let names: Vec<String> = files
            .iter()
            .map(|f| match f {
                FilePayload::Path(p) => p.display().to_string(),
                FilePayload::Buffer { name, .. } => name.clone(),
            })
            .collect();
        self.calls
            .push(format!("set_files {} [{}]", locator, names.join(", ")));
        self.elements[index].files = files.to_vec();
        Ok(())
    }

    fn is_visible(&mut self, locator: &Locator, _options: &Value) -> Result<bool, BrowserError> {
        self.calls.push(format!("is_visible {}", locator));
        Ok(self
            .matches(locator)
            .first()
            .is_some_and(|i| self.elements[*i].visible))
    }

    fn is_fillable(&mut self, locator: &Locator, _options: &Value) -> Result<bool, BrowserError> {
        let index = self.first(locator)?;
        Ok(self.elements[index].fillable)
    }

    fn text_content(&mut self, locator: &Locator, _options: &Value) -> Result<String, BrowserError> {
        let index = self.first(locator)?;
        self.calls.push(format!("text {}", locator));
        let element = &mut self.elements[index];
        if let Some((reads, text)) = &element.later_text {
            if element.text_reads >= *reads {
                element.text = text.clone();
                element.later_text = None;
            }
        }
        element.text_reads += 1;
        Ok(element.text.clone())
    }

    fn input_value(&mut self, locator: &Locator, _options: &Value) -> Result<String, BrowserError> {
        let index = self.first(locator)?;
        Ok(self.elements[index].value.clone())
    }

    fn attribute(&mut self, locator: &Locator, name: &str, _options: &Value) -> Result<Option<String>, BrowserError> {
        let index = self.first(locator)?;
        self.calls.push(format!("attribute {} {}", locator, name));
        Ok(self.elements[index].attributes.get(name).cloned())
    }

    fn computed_style(&mut self, locator: &Locator, property: &str, _options: &Value) -> Result<String, BrowserError> {
        let index = self.first(locator)?;
        Ok(self.elements[index]
            .styles
            .get(property)
            .cloned()
            .unwrap_or_default())
    }
}
