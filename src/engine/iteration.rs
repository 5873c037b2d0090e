use tracing::{info, warn};

use crate::engine::error::StepError;
use crate::engine::runtime::Runtime;
use crate::engine::step::{StepInterpreter, unit_title};
use crate::scenario::context::ExecutionContext;
use crate::scenario::scenario_model::Step;

/// Grouped iteration: a run of consecutive steps sharing one
/// `iterativeGroup` repeats once per match of the first step's selector.
pub struct IterationController;

impl IterationController {
    /// Length of the maximal run of steps starting at `start` that share the
    /// start step's group id. Zero when that step has no group.
    pub fn group_len(steps: &[Step], start: usize) -> usize {
        let Some(group) = steps.get(start).and_then(|s| s.group.as_deref()) else {
            return 0;
        };
        steps[start..]
            .iter()
            .take_while(|s| s.group.as_deref() == Some(group))
            .count()
    }

    /// Run a group.
    ///
    /// The repeat count is read once, from the first step's live matches
    /// (narrowed by its explicit index, if any). Every step re-resolves its
    /// own selector on every pass, so DOM changes made by earlier passes are
    /// seen by later ones; a collection that reorders mid-loop shifts indices.
    /// A failure ends the group and records every unit it did not reach as
    /// skipped.
    pub fn run_group(rt: &mut Runtime<'_>, steps: &[Step], ctx: &ExecutionContext) -> Result<(), StepError> {
        let Some(first) = steps.first() else {
            return Ok(());
        };
        let group = first.group.as_deref().unwrap_or_default();

        let Some(driving) = first.locator() else {
            warn!(group, "first step of iterative group has no selector; running steps once in order");
            for (position, step) in steps.iter().enumerate() {
                if let Err(e) = StepInterpreter::execute(rt, step, ctx) {
                    for rest in &steps[position + 1..] {
                        rt.recorder.skip(rest.name.clone());
                    }
                    return Err(e);
                }
            }
            return Ok(());
        };

        let total = rt.page.count(&driving)?;
        info!(group, selector = %driving, total, steps = steps.len(), "iterating group");

        for index in 0..total {
            let scoped = ctx.with_iteration(index, total);
            for (position, step) in steps.iter().enumerate() {
                if let Err(e) = StepInterpreter::execute_at(rt, step, index, &scoped) {
                    Self::skip_rest(rt, steps, index, position + 1, total);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Record as skipped the units of pass `index` from `steps[from]` on, and
    /// every unit of the passes after it.
    fn skip_rest(rt: &mut Runtime<'_>, steps: &[Step], index: usize, from: usize, total: usize) {
        for pass in index..total {
            let start = if pass == index { from } else { 0 };
            for step in &steps[start..] {
                rt.recorder.skip(unit_title(&step.name, pass, total));
            }
        }
    }
}
