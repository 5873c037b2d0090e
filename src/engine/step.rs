use tracing::{info, warn};

use crate::browser::locator::Locator;
use crate::engine::action::ActionEngine;
use crate::engine::error::StepError;
use crate::engine::runtime::Runtime;
use crate::engine::validation::ValidationEngine;
use crate::scenario::context::ExecutionContext;
use crate::scenario::scenario_model::Step;

/// Executes single steps: locate, act, wait, validate.
pub struct StepInterpreter;

impl StepInterpreter {
    /// Execute a step that is not part of an iteration group.
    ///
    /// With `iterate` set, the step runs once per live match of its own
    /// selector; otherwise once against its (optionally indexed) locator.
    pub fn execute(rt: &mut Runtime<'_>, step: &Step, ctx: &ExecutionContext) -> Result<(), StepError> {
        if step.iterate {
            return Self::fan_out(rt, step, ctx);
        }
        let locator = step.locator();
        Self::run_unit(rt, step, &step.name, locator.as_ref(), ctx)
    }

    /// Execute one repetition of `step` at iteration `index`.
    ///
    /// The locator is re-derived from the step's selector on every call: the
    /// step's explicit index wins, otherwise `index` applies. `ctx` is
    /// expected to carry the iteration fields already.
    pub fn execute_at(
        rt: &mut Runtime<'_>,
        step: &Step,
        index: usize,
        ctx: &ExecutionContext,
    ) -> Result<(), StepError> {
        let locator = step
            .base_locator()
            .map(|l| l.nth(step.nth.unwrap_or(index)));
        let title = match ctx.iteration() {
            Some(scope) => unit_title(&step.name, scope.index, scope.total),
            None => step.name.clone(),
        };
        Self::run_unit(rt, step, &title, locator.as_ref(), ctx)
    }

    fn fan_out(rt: &mut Runtime<'_>, step: &Step, ctx: &ExecutionContext) -> Result<(), StepError> {
        let counting = step.locator().ok_or_else(|| StepError::MissingLocator {
            step: step.name.clone(),
            reason: "iterating step has no selector".into(),
        })?;

        let total = rt.page.count(&counting)?;
        if total == 0 {
            warn!(step = %step.name, selector = %counting, "iterating step matched no elements");
        } else {
            info!(step = %step.name, total, "iterating over matches");
        }

        for index in 0..total {
            let scoped = ctx.with_iteration(index, total);
            if let Err(e) = Self::execute_at(rt, step, index, &scoped) {
                for rest in index + 1..total {
                    rt.recorder.skip(unit_title(&step.name, rest, total));
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// One recorded execution: action, post-action wait, validations.
    fn run_unit(
        rt: &mut Runtime<'_>,
        step: &Step,
        title: &str,
        locator: Option<&Locator>,
        ctx: &ExecutionContext,
    ) -> Result<(), StepError> {
        let handle = rt.recorder.begin(title);
        let result = Self::run_body(rt, step, locator, ctx);
        rt.recorder.end(handle, result.as_ref().map(|_| ()));
        result
    }

    fn run_body(
        rt: &mut Runtime<'_>,
        step: &Step,
        locator: Option<&Locator>,
        ctx: &ExecutionContext,
    ) -> Result<(), StepError> {
        ActionEngine::perform(rt, step, locator, ctx)?;

        if let Some(ms) = step.wait_ms {
            rt.page.wait_for_timeout(ms)?;
        }

        for validation in &step.validations {
            ValidationEngine::validate(rt, validation, locator, ctx, &step.name)?;
        }
        Ok(())
    }
}

/// Record title of repetition `index` (zero-based) out of `total`: `"name [i/N]"`.
pub fn unit_title(name: &str, index: usize, total: usize) -> String {
    format!("{} [{}/{}]", name, index + 1, total)
}
