use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::browser::page::PageDriver;
use crate::engine::driver::ScenarioDriver;
use crate::engine::plugins::PluginRegistry;
use crate::engine::recorder::{SoftFailure, StepRecord, StepRecorder, StepSink, StepStatus};
use crate::engine::runtime::{RunSettings, Runtime};
use crate::scenario::context::ExecutionContext;
use crate::scenario::scenario_model::Scenario;

/// Outcome of one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub description: String,

    /// False when a hard error aborted the run or any soft check failed
    pub passed: bool,

    /// Step units that actually executed (skipped ones excluded)
    pub steps_run: usize,

    pub steps: Vec<StepRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub soft_failures: Vec<SoftFailure>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub duration_ms: u64,
}

/// Runs whole scenarios against a page.
pub struct ScenarioRunner;

impl ScenarioRunner {
    /// Run `scenario` from an empty context. Never fails: a hard error ends
    /// up verbatim in [`ScenarioResult::error`].
    pub fn run(
        scenario: &Scenario,
        page: &mut dyn PageDriver,
        plugins: &PluginRegistry,
        settings: &RunSettings,
        sink: Option<Box<dyn StepSink + Send>>,
    ) -> ScenarioResult {
        let started = Instant::now();
        info!(scenario = %scenario.description, steps = scenario.steps.len(), "running scenario");

        let mut recorder = match sink {
            Some(sink) => StepRecorder::with_sink(sink),
            None => StepRecorder::new(),
        };

        let outcome = {
            let mut rt = Runtime {
                page,
                plugins,
                settings,
                recorder: &mut recorder,
            };
            ScenarioDriver::run(&mut rt, &scenario.steps, &ExecutionContext::new())
        };

        let (steps, soft_failures) = recorder.into_parts();
        let error = outcome.err().map(|e| e.to_string());
        let steps_run = steps
            .iter()
            .filter(|r| r.status != StepStatus::Skipped)
            .count();
        let passed = error.is_none() && soft_failures.is_empty();
        let duration_ms = started.elapsed().as_millis() as u64;

        match &error {
            Some(e) => error!(scenario = %scenario.description, duration_ms, "scenario failed: {}", e),
            None if !passed => warn!(
                scenario = %scenario.description,
                soft_failures = soft_failures.len(),
                duration_ms,
                "scenario finished with soft failures"
            ),
            None => info!(scenario = %scenario.description, duration_ms, "scenario passed"),
        }

        ScenarioResult {
            description: scenario.description.clone(),
            passed,
            steps_run,
            steps,
            soft_failures,
            error,
            duration_ms,
        }
    }
}
