use tracing::{debug, info};

use crate::browser::error::BrowserError;
use crate::browser::locator::Locator;
use crate::browser::page::FilePayload;
use crate::engine::error::StepError;
use crate::engine::runtime::Runtime;
use crate::scenario::context::ExecutionContext;
use crate::scenario::scenario_model::{Action, FileSource, Step, Upload};

/// Elements `fill` falls back to inside a non-fillable target.
pub const FILLABLE_DESCENDANTS: &str = "input:not([type=hidden]):not([type=file]):not([type=checkbox]):not([type=radio]):not([type=submit]):not([type=button]), textarea, [contenteditable=''], [contenteditable='true']";

/// Executes one declared action.
pub struct ActionEngine;

impl ActionEngine {
    /// Perform `step.action` against `locator`, or the page when the action
    /// needs no element.
    pub fn perform(
        rt: &mut Runtime<'_>,
        step: &Step,
        locator: Option<&Locator>,
        ctx: &ExecutionContext,
    ) -> Result<(), StepError> {
        Self::dispatch(rt, step, locator, ctx).map_err(|e| match e {
            StepError::Browser(BrowserError::NoMatch { selector }) => StepError::MissingLocator {
                step: step.name.clone(),
                reason: format!("'{}' matched no element", selector),
            },
            other => other,
        })
    }

    fn dispatch(
        rt: &mut Runtime<'_>,
        step: &Step,
        locator: Option<&Locator>,
        ctx: &ExecutionContext,
    ) -> Result<(), StepError> {
        let options = &step.options;

        match &step.action {
            Action::Navigate { path } => {
                let url = rt.settings.url_for(path);
                info!(step = %step.name, %url, "navigating");
                rt.page.goto(&url)?;
                Ok(())
            }

            Action::Fill { value } => Self::fill(rt, step, Self::require(step, locator)?, value),

            Action::Type { text } => {
                rt.page.type_text(Self::require(step, locator)?, text, options)?;
                Ok(())
            }

            Action::Click => {
                rt.page.click(Self::require(step, locator)?, options)?;
                Ok(())
            }

            Action::Hover => {
                rt.page.hover(Self::require(step, locator)?, options)?;
                Ok(())
            }

            Action::PressKey { key } => {
                rt.page.press(Self::require(step, locator)?, key, options)?;
                Ok(())
            }

            Action::Wait { ms } => {
                rt.page.wait_for_timeout(*ms)?;
                Ok(())
            }

            Action::Upload(upload) => Self::upload(rt, step, Self::require(step, locator)?, upload),

            Action::Custom { name, .. } => {
                let handler = rt.plugins.action(name)?;
                debug!(step = %step.name, plugin = %name, "dispatching custom action");
                handler(&mut *rt.page, step, ctx, locator)
            }
        }
    }

    fn require<'l>(step: &Step, locator: Option<&'l Locator>) -> Result<&'l Locator, StepError> {
        locator.ok_or_else(|| StepError::MissingLocator {
            step: step.name.clone(),
            reason: format!("action '{}' needs a selector", step.action.name()),
        })
    }

    /// Fill the target, or the first visible fillable element revealed by
    /// clicking it (collapsed search boxes and similar widgets).
    fn fill(rt: &mut Runtime<'_>, step: &Step, locator: &Locator, value: &str) -> Result<(), StepError> {
        if rt.page.is_fillable(locator, &step.options)? {
            rt.page.fill(locator, value, &step.options)?;
            return Ok(());
        }

        // The click lands on the first match; search that element only.
        let element = locator.nth(locator.nth.unwrap_or(0));
        debug!(step = %step.name, target = %element, "target not fillable, searching descendants");
        rt.page.click(&element, &step.options)?;

        let candidates = element.locate(FILLABLE_DESCENDANTS);
        let count = rt.page.count(&candidates)?;
        for i in 0..count {
            let candidate = candidates.nth(i);
            if rt.page.is_visible(&candidate, &step.options)? {
                rt.page.fill(&candidate, value, &step.options)?;
                return Ok(());
            }
        }

        Err(StepError::NotFillable(locator.to_string()))
    }

    fn upload(rt: &mut Runtime<'_>, step: &Step, locator: &Locator, upload: &Upload) -> Result<(), StepError> {
        if upload.sources.is_empty() {
            return Err(StepError::NoFilesProvided(step.name.clone()));
        }

        let files: Vec<FilePayload> = upload
            .sources
            .iter()
            .map(|source| match source {
                FileSource::Path(path) if upload.resolve_from_base => {
                    FilePayload::Path(rt.settings.resolve_path(path))
                }
                FileSource::Path(path) => FilePayload::Path(path.clone()),
                FileSource::Embedded {
                    name,
                    mime_type,
                    contents,
                } => FilePayload::Buffer {
                    name: name.clone(),
                    mime_type: mime_type.clone(),
                    contents: contents.clone(),
                },
            })
            .collect();

        if upload.clear_first {
            rt.page.set_files(locator, &[], &step.options)?;
        }
        debug!(step = %step.name, files = files.len(), "setting input files");
        rt.page.set_files(locator, &files, &step.options)?;
        Ok(())
    }
}
