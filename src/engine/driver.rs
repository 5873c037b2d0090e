use tracing::info;

use crate::engine::error::StepError;
use crate::engine::iteration::IterationController;
use crate::engine::runtime::Runtime;
use crate::engine::step::StepInterpreter;
use crate::scenario::context::ExecutionContext;
use crate::scenario::scenario_model::Step;

/// Walks a scenario's steps, handing grouped runs to the
/// [`IterationController`] and everything else to the [`StepInterpreter`].
pub struct ScenarioDriver;

impl ScenarioDriver {
    /// Execute `steps` in order. The first hard failure is returned and every
    /// step not yet reached is recorded as skipped.
    pub fn run(rt: &mut Runtime<'_>, steps: &[Step], ctx: &ExecutionContext) -> Result<(), StepError> {
        let mut position = 0;

        while position < steps.len() {
            let step = &steps[position];

            let (outcome, next) = match step.group.as_deref() {
                Some(group) => {
                    let len = IterationController::group_len(steps, position);
                    info!(group, first = %step.name, steps = len, "entering iterative group");
                    let outcome = IterationController::run_group(rt, &steps[position..position + len], ctx);
                    (outcome, position + len)
                }
                None => {
                    info!(step = %step.name, action = step.action.name(), "running step");
                    (StepInterpreter::execute(rt, step, ctx), position + 1)
                }
            };

            if let Err(e) = outcome {
                for skipped in &steps[next..] {
                    rt.recorder.skip(skipped.name.clone());
                }
                return Err(e);
            }
            position = next;
        }
        Ok(())
    }
}
