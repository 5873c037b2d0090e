use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::browser::session::BrowserSession;
use crate::cli::config::{AppConfig, RunArgs, ScenarioArgs};
use crate::engine::recorder::StepSink;
use crate::engine::runner::{ScenarioResult, ScenarioRunner};
use crate::engine::runtime::RunSettings;
use crate::plugins::default_registry;
use crate::report::console::format_console_report;
use crate::report::html::generate_html_report;
use crate::report::json_steps::JsonStepsWriter;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::TestSuiteReport;
use crate::scenario::loader::{ScenarioSource, filter};
use crate::scenario::scenario_model::Scenario;
use crate::trace::logger::RunLogger;

// ============================================================================
// run subcommand
// ============================================================================

/// Run every selected scenario, each in a fresh browser session, and return
/// whether all passed.
pub fn cmd_run(args: &RunArgs, config: &AppConfig, verbose: u8) -> Result<bool, Box<dyn std::error::Error>> {
    let logger = RunLogger::open(&config.run.log_dir, verbose);
    if let Some(path) = logger.path() {
        info!(log = %path.display(), "logging run");
    }

    let scenarios = load_scenarios(&args.source, config)?;
    if scenarios.is_empty() {
        eprintln!("No enabled scenarios found");
        return Ok(true);
    }

    let settings = RunSettings {
        base_url: args
            .base_url
            .clone()
            .or_else(|| config.base_url_for(args.env.as_deref())),
        working_dir: std::env::current_dir()?,
        expect_timeout_ms: config.run.expect_timeout_ms,
    };
    let bridge = config
        .browser
        .bridge(args.headless.unwrap_or(config.run.headless));
    let plugins = default_registry();
    let steps_dir = config.run.report_dir.join("json");

    info!(
        scenarios = scenarios.len(),
        base_url = settings.base_url.as_deref().unwrap_or("-"),
        headless = bridge.headless,
        "starting run"
    );

    let start = Instant::now();
    let mut results = Vec::with_capacity(scenarios.len());
    for scenario in &scenarios {
        let mut session = match BrowserSession::launch(&bridge) {
            Ok(s) => s,
            Err(e) => {
                warn!(scenario = %scenario.description, "browser launch failed: {}", e);
                results.push(launch_failure(scenario, &e));
                continue;
            }
        };

        let sink: Box<dyn StepSink + Send> = Box::new(JsonStepsWriter::new(&steps_dir, &scenario.description));
        let result = ScenarioRunner::run(scenario, &mut session, &plugins, &settings, Some(sink));
        if let Err(e) = session.quit() {
            warn!(scenario = %scenario.description, "browser did not shut down cleanly: {}", e);
        }
        results.push(result);
    }

    let report = TestSuiteReport::from_results("UI scenarios", results)
        .with_duration(start.elapsed().as_millis());
    let all_passed = report.all_passed();
    info!(passed = report.passed, failed = report.failed, "run complete");

    let format = args.format.as_deref().unwrap_or(&config.run.format);
    let output_content = match format {
        "html" => generate_html_report(&report),
        "junit" => generate_junit_xml(&report),
        "json" => report.to_json()?,
        _ => format_console_report(&report),
    };

    match args.output.as_ref().or(config.run.output.as_ref()) {
        Some(path) => write_output(path, &output_content)?,
        None => print!("{}", output_content),
    }

    logger.close();
    Ok(all_passed)
}

// ============================================================================
// list / validate subcommands
// ============================================================================

pub fn cmd_list(args: &ScenarioArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let scenarios = load_scenarios(args, config)?;
    print!("{}", format_listing(&scenarios));
    Ok(())
}

/// Load every document; any invalid one is returned as the error.
pub fn cmd_validate(args: &ScenarioArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let scenarios = load_scenarios(args, config)?;
    let steps: usize = scenarios.iter().map(|s| s.steps.len()).sum();
    println!("{} scenario(s), {} step(s): OK", scenarios.len(), steps);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve the scenario source (SCENARIOS_JSON, SCENARIOS_FILE, --scenarios,
/// then the configured directory), load it and apply `--grep`.
pub fn load_scenarios(args: &ScenarioArgs, config: &AppConfig) -> Result<Vec<Scenario>, Box<dyn std::error::Error>> {
    let default = args
        .scenarios
        .clone()
        .unwrap_or_else(|| config.run.scenario_dir.clone());
    let source = ScenarioSource::select(args.scenarios_json.clone(), args.scenarios_file.clone(), &default);
    let scenarios = source.load()?;
    Ok(filter(scenarios, args.grep.as_deref())?)
}

/// One line per scenario: description and step count.
pub fn format_listing(scenarios: &[Scenario]) -> String {
    let mut out = String::new();
    for scenario in scenarios {
        out.push_str(&format!(
            "{} ({} steps)\n",
            scenario.description,
            scenario.steps.len()
        ));
    }
    out.push_str(&format!("{} scenario(s)\n", scenarios.len()));
    out
}

fn launch_failure(scenario: &Scenario, error: &dyn std::error::Error) -> ScenarioResult {
    ScenarioResult {
        description: scenario.description.clone(),
        passed: false,
        steps_run: 0,
        steps: Vec::new(),
        soft_failures: Vec::new(),
        error: Some(format!("Failed to launch browser: {}", error)),
        duration_ms: 0,
    }
}

fn write_output(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

