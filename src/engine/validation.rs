use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::error::BrowserError;
use crate::browser::locator::Locator;
use crate::engine::error::StepError;
use crate::engine::runtime::Runtime;
use crate::engine::selector::Target;
use crate::scenario::context::ExecutionContext;
use crate::scenario::scenario_model::{Check, Validation};

/// Pause between two reads of a failing check.
pub const POLL_INTERVAL_MS: u64 = 100;

/// Executes one declared assertion.
pub struct ValidationEngine;

impl ValidationEngine {
    /// Run `validation` for the step labelled `step`.
    ///
    /// The element under test is the validation's own selector when it has
    /// one, otherwise `scope`. Inside an iteration, a validation without an
    /// explicit index is narrowed to the iteration index.
    ///
    /// A failing check is read again every [`POLL_INTERVAL_MS`] until it
    /// passes or `options.timeout` (else the run's expect timeout) runs out.
    /// Only the final outcome counts: soft failures are recorded on the
    /// runtime's recorder and swallowed; configuration errors are returned
    /// at once and never retried.
    pub fn validate(
        rt: &mut Runtime<'_>,
        validation: &Validation,
        scope: Option<&Locator>,
        ctx: &ExecutionContext,
        step: &str,
    ) -> Result<(), StepError> {
        let iteration = ctx.iteration().map(|s| s.index);
        debug!(step, validation = validation.check.name(), "validating");
        match Self::poll(rt, validation, scope, iteration, ctx, step) {
            Ok(()) => Ok(()),
            Err(e) if validation.soft && !e.is_configuration() => {
                warn!(step, validation = validation.check.name(), "soft validation failed: {}", e);
                rt.recorder.soft_failure(step, iteration, e.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// The locator a validation checks, before any page query.
    pub fn element(
        validation: &Validation,
        scope: Option<&Locator>,
        iteration: Option<usize>,
    ) -> Option<Locator> {
        let base = validation
            .target
            .as_ref()
            .map(Target::locator)
            .or_else(|| scope.cloned());
        base.map(|b| b.maybe_nth(validation.nth.or(iteration)))
    }

    /// Retry window for `validation`, in milliseconds.
    pub fn timeout_ms(validation: &Validation, default_ms: u64) -> u64 {
        validation
            .options
            .get("timeout")
            .and_then(Value::as_u64)
            .unwrap_or(default_ms)
    }

    fn poll(
        rt: &mut Runtime<'_>,
        validation: &Validation,
        scope: Option<&Locator>,
        iteration: Option<usize>,
        ctx: &ExecutionContext,
        step: &str,
    ) -> Result<(), StepError> {
        let timeout = Self::timeout_ms(validation, rt.settings.expect_timeout_ms);
        let mut waited = 0;
        loop {
            match Self::evaluate(rt, validation, scope, iteration, ctx, step) {
                Err(e) if retryable(&e) && waited < timeout => {
                    let pause = POLL_INTERVAL_MS.min(timeout - waited);
                    rt.page.wait_for_timeout(pause)?;
                    waited += pause;
                }
                outcome => return outcome,
            }
        }
    }

    fn evaluate(
        rt: &mut Runtime<'_>,
        validation: &Validation,
        scope: Option<&Locator>,
        iteration: Option<usize>,
        ctx: &ExecutionContext,
        step: &str,
    ) -> Result<(), StepError> {
        match &validation.check {
            Check::Unsupported(kind) => {
                warn!(step, "Unsupported validation type: {}", kind);
                Ok(())
            }

            Check::HasTitle(expected) => {
                let title = rt.page.title(&validation.options)?;
                if title == *expected {
                    Ok(())
                } else {
                    Err(fail(
                        validation,
                        format!("expected page title '{}', got '{}'", expected, title),
                    ))
                }
            }

            Check::HasUrl(pattern) => {
                let url = rt.page.url(&validation.options)?;
                if pattern.is_match(&url) {
                    Ok(())
                } else {
                    Err(fail(
                        validation,
                        format!("expected page URL to match /{}/, got '{}'", pattern.as_str(), url),
                    ))
                }
            }

            Check::Custom { name, .. } => {
                let handler = rt.plugins.validation(name)?;
                let element = Self::element(validation, scope, iteration);
                handler(&mut *rt.page, validation, ctx, element.as_ref())
            }

            _ => {
                let element = Self::element(validation, scope, iteration).ok_or_else(|| {
                    StepError::MissingLocator {
                        step: step.to_string(),
                        reason: format!(
                            "validation '{}' has no selector and no element in scope",
                            validation.check.name()
                        ),
                    }
                })?;
                Self::check_element(rt, validation, &element)
            }
        }
    }

    fn check_element(
        rt: &mut Runtime<'_>,
        validation: &Validation,
        element: &Locator,
    ) -> Result<(), StepError> {
        let options = &validation.options;

        match &validation.check {
            Check::Visible => {
                if rt.page.is_visible(element, options)? {
                    Ok(())
                } else {
                    Err(fail(validation, format!("expected '{}' to be visible", element)))
                }
            }

            Check::Hidden => {
                if rt.page.is_visible(element, options)? {
                    Err(fail(validation, format!("expected '{}' to be hidden", element)))
                } else {
                    Ok(())
                }
            }

            Check::HasText(expected) => {
                let text = rt.page.text_content(element, options)?;
                if normalize_whitespace(&text) == normalize_whitespace(expected) {
                    Ok(())
                } else {
                    Err(fail(
                        validation,
                        format!("expected '{}' to have text '{}', got '{}'", element, expected, text.trim()),
                    ))
                }
            }

            Check::ContainsText(expected) => {
                let text = rt.page.text_content(element, options)?;
                if normalize_whitespace(&text).contains(&normalize_whitespace(expected)) {
                    Ok(())
                } else {
                    Err(fail(
                        validation,
                        format!("expected '{}' to contain text '{}', got '{}'", element, expected, text.trim()),
                    ))
                }
            }

            Check::HasValue(expected) => {
                let value = rt.page.input_value(element, options)?;
                if value == *expected {
                    Ok(())
                } else {
                    Err(fail(
                        validation,
                        format!("expected '{}' to have value '{}', got '{}'", element, expected, value),
                    ))
                }
            }

            Check::HasAttribute { name, expected } => {
                match (rt.page.attribute(element, name, options)?, expected) {
                    (None, _) => Err(fail(
                        validation,
                        format!("expected '{}' to have attribute '{}'", element, name),
                    )),
                    (Some(actual), Some(expected)) if actual != *expected => Err(fail(
                        validation,
                        format!(
                            "expected attribute '{}' of '{}' to be '{}', got '{}'",
                            name, element, expected, actual
                        ),
                    )),
                    _ => Ok(()),
                }
            }

            Check::HasCss { property, expected } => {
                let actual = rt.page.computed_style(element, property, options)?;
                if actual == *expected {
                    Ok(())
                } else {
                    Err(fail(
                        validation,
                        format!(
                            "expected CSS '{}' of '{}' to be '{}', got '{}'",
                            property, element, expected, actual
                        ),
                    ))
                }
            }

            Check::HasClass(pattern) => {
                let class = rt.page.attribute(element, "class", options)?.unwrap_or_default();
                if pattern.is_match(&class) {
                    Ok(())
                } else {
                    Err(fail(
                        validation,
                        format!(
                            "expected class of '{}' to match /{}/, got '{}'",
                            element,
                            pattern.as_str(),
                            class
                        ),
                    ))
                }
            }

            // Page-level and plugin checks are handled by `evaluate`.
            Check::HasTitle(_) | Check::HasUrl(_) | Check::Custom { .. } | Check::Unsupported(_) => Ok(()),
        }
    }
}

/// Failures the page may still grow out of: a mismatch, or an element
/// that is not there yet.
fn retryable(error: &StepError) -> bool {
    matches!(
        error,
        StepError::AssertionFailed(_) | StepError::Browser(BrowserError::NoMatch { .. })
    )
}

fn fail(validation: &Validation, detail: String) -> StepError {
    match &validation.message {
        Some(message) => StepError::AssertionFailed(format!("{}: {}", message, detail)),
        None => StepError::AssertionFailed(detail),
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
