#![allow(dead_code)]

pub mod fake_page;

use std::path::PathBuf;

use ui_scenario_runner::engine::driver::ScenarioDriver;
use ui_scenario_runner::engine::error::StepError;
use ui_scenario_runner::engine::plugins::PluginRegistry;
use ui_scenario_runner::engine::recorder::StepRecorder;
use ui_scenario_runner::engine::runtime::{RunSettings, Runtime};
use ui_scenario_runner::plugins::default_registry;
use ui_scenario_runner::scenario::context::ExecutionContext;
use ui_scenario_runner::scenario::scenario_model::Step;

use self::fake_page::FakePage;

pub const BASE_URL: &str = "https://app.test";

pub fn settings() -> RunSettings {
    RunSettings {
        base_url: Some(BASE_URL.to_string()),
        working_dir: PathBuf::from("/work"),
        expect_timeout_ms: 0,
    }
}

/// Drive `steps` against `page` with the bundled plugins.
pub fn run_steps(page: &mut FakePage, steps: &[Step]) -> (Result<(), StepError>, StepRecorder) {
    run_steps_with(page, steps, &default_registry())
}

pub fn run_steps_with(
    page: &mut FakePage,
    steps: &[Step],
    plugins: &PluginRegistry,
) -> (Result<(), StepError>, StepRecorder) {
    run_steps_with_settings(page, steps, plugins, &settings())
}

pub fn run_steps_with_settings(
    page: &mut FakePage,
    steps: &[Step],
    plugins: &PluginRegistry,
    settings: &RunSettings,
) -> (Result<(), StepError>, StepRecorder) {
    let mut recorder = StepRecorder::new();
    let result = {
        let mut rt = Runtime {
            page,
            plugins,
            settings,
            recorder: &mut recorder,
        };
        ScenarioDriver::run(&mut rt, steps, &ExecutionContext::new())
    };
    (result, recorder)
}

pub fn titles(recorder: &StepRecorder) -> Vec<String> {
    recorder.records().iter().map(|r| r.title.clone()).collect()
}
