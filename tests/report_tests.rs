use std::fs;

use chrono::NaiveDate;
use ui_scenario_runner::engine::error::StepError;
use ui_scenario_runner::engine::recorder::{
    SoftFailure, StepRecord, StepRecorder, StepSink, StepStatus,
};
use ui_scenario_runner::engine::runner::ScenarioResult;
use ui_scenario_runner::report::console::format_console_report;
use ui_scenario_runner::report::html::generate_html_report;
use ui_scenario_runner::report::json_steps::{JsonStepsWriter, safe_name};
use ui_scenario_runner::report::junit::{escape_xml, generate_junit_xml};
use ui_scenario_runner::report::report_model::TestSuiteReport;
use ui_scenario_runner::trace::logger::log_file_name;

// ============================================================================
// Helper builders
// ============================================================================

fn record(title: &str, status: StepStatus) -> StepRecord {
    StepRecord {
        title: title.to_string(),
        status,
        error: None,
        start_time: 1_000,
        end_time: Some(1_050),
    }
}

fn passing_result(name: &str) -> ScenarioResult {
    ScenarioResult {
        description: name.to_string(),
        passed: true,
        steps_run: 2,
        steps: vec![
            record("open", StepStatus::Passed),
            record("check", StepStatus::Passed),
        ],
        soft_failures: vec![],
        error: None,
        duration_ms: 1_200,
    }
}

fn aborted_result(name: &str) -> ScenarioResult {
    let mut failed = record("submit", StepStatus::Failed);
    failed.error = Some("Step 'submit' requires a locator: '#go' matched no element".into());
    ScenarioResult {
        description: name.to_string(),
        passed: false,
        steps_run: 2,
        steps: vec![
            record("open", StepStatus::Passed),
            failed,
            record("confirm", StepStatus::Skipped),
        ],
        soft_failures: vec![],
        error: Some("Step 'submit' requires a locator: '#go' matched no element".into()),
        duration_ms: 900,
    }
}

fn soft_result(name: &str) -> ScenarioResult {
    ScenarioResult {
        description: name.to_string(),
        passed: false,
        steps_run: 1,
        steps: vec![record("title [2/3]", StepStatus::Failed)],
        soft_failures: vec![SoftFailure {
            step: "title".into(),
            iteration: Some(1),
            message: "expected '.title' to have text 'Shoes', got 'Boots'".into(),
        }],
        error: None,
        duration_ms: 400,
    }
}

fn mixed_suite_report() -> TestSuiteReport {
    TestSuiteReport::from_results(
        "checkout",
        vec![
            passing_result("Add to cart"),
            aborted_result("Pay by card"),
            soft_result("Search results"),
        ],
    )
}

// ============================================================================
// 1. Suite report counts
// ============================================================================

#[test]
fn suite_report_counts_hard_and_soft_failures() {
    let report = mixed_suite_report();
    assert_eq!(report.total, 3);
    assert_eq!(report.passed, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(report.soft_failed, 1);
    assert!(!report.all_passed());
}

#[test]
fn empty_suite_passes() {
    let report = TestSuiteReport::from_results("empty", vec![]);
    assert_eq!(report.total, 0);
    assert!(report.all_passed());
}

// ============================================================================
// 2. Console
// ============================================================================

#[test]
fn console_lists_each_scenario_with_markers() {
    let out = format_console_report(&mixed_suite_report().with_duration(4_200));

    assert!(out.starts_with("=== Test Suite: checkout ===\n"));
    assert!(out.contains("\u{2713} PASS  Add to cart (2 steps)"));
    assert!(out.contains("\u{2717} FAIL  Pay by card (2 of 3 steps)"));
    assert!(out.contains("[ERROR] Step 'submit' requires a locator"));
    assert!(out.contains("[SKIP]  confirm"));
    assert!(out.contains("[SOFT]  title #2: expected '.title' to have text 'Shoes', got 'Boots'"));
    assert!(out.contains("=== Results: 1 passed, 2 failed (3 total) in 4.2s ==="));
}

#[test]
fn console_summary_omits_missing_duration() {
    let report = TestSuiteReport::from_results("quick", vec![passing_result("a")]);
    let out = format_console_report(&report);
    assert!(out.ends_with("=== Results: 1 passed, 0 failed (1 total) ===\n"));
}

// ============================================================================
// 3. JUnit
// ============================================================================

#[test]
fn junit_marks_failures_by_kind() {
    let xml = generate_junit_xml(&mixed_suite_report().with_duration(3_100));

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<testsuite name=\"checkout\" tests=\"3\" failures=\"2\" time=\"3.100\">"));
    assert!(xml.contains(
        "<testcase name=\"Add to cart\" classname=\"ui-scenario-runner\" time=\"1.200\" />"
    ));
    assert!(xml.contains("type=\"StepFailure\""));
    assert!(xml.contains("message=\"1 soft failure(s)\" type=\"SoftAssertionFailure\""));
    assert!(xml.contains("title (iteration 2): expected &apos;.title&apos;"));
    assert_eq!(xml.matches("<failure").count(), 2);
}

#[test]
fn junit_escapes_markup() {
    assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");

    let report = TestSuiteReport::from_results("<suite>", vec![passing_result("x & y")]);
    let xml = generate_junit_xml(&report);
    assert!(xml.contains("name=\"&lt;suite&gt;\""));
    assert!(xml.contains("name=\"x &amp; y\""));
}

// ============================================================================
// 4. HTML
// ============================================================================

#[test]
fn html_report_renders_cards_and_step_statuses() {
    let html = generate_html_report(&mixed_suite_report());

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("SOME SCENARIOS FAILED"));
    assert!(html.contains("checkout: 1 passed, 2 failed (3 total)"));
    assert!(html.contains("<div class=\"scenario pass\">"));
    assert!(html.contains("<li class=\"skipped\">confirm <span>skipped</span></li>"));
    assert!(html.contains("<p class=\"error\">Error: Step &#39;submit&#39; requires a locator"));
    assert!(html.contains("<ul class=\"soft\">"));
}

#[test]
fn html_report_all_passed_header() {
    let report = TestSuiteReport::from_results("smoke", vec![passing_result("<home>")]);
    let html = generate_html_report(&report);

    assert!(html.contains("ALL SCENARIOS PASSED"));
    assert!(html.contains("&lt;home&gt;"));
    assert!(!html.contains("<home>"));
}

// ============================================================================
// 5. JSON
// ============================================================================

#[test]
fn json_report_uses_camel_case_and_round_trips() {
    let report = mixed_suite_report().with_duration(10);
    let json = report.to_json().expect("serializes");

    assert!(json.contains("\"suiteName\": \"checkout\""));
    assert!(json.contains("\"softFailed\": 1"));
    assert!(json.contains("\"stepsRun\""));
    assert!(json.contains("\"status\": \"skipped\""));

    let back: TestSuiteReport = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(back.results.len(), 3);
    assert_eq!(back.results[2].soft_failures[0].iteration, Some(1));
    assert!(back.results[0].soft_failures.is_empty());
}

// ============================================================================
// 6. Step recorder and JSON steps file
// ============================================================================

#[test]
fn recorder_soft_failures_fail_only_their_own_step() {
    let mut recorder = StepRecorder::new();

    let first = recorder.begin("first");
    recorder.soft_failure("first", None, "title mismatch".into());
    recorder.end(first, Ok(()));
    let second = recorder.begin("second");
    recorder.end(second, Ok(()));
    let third = recorder.begin("third");
    let err = StepError::AssertionFailed("boom".into());
    recorder.end(third, Err(&err));
    recorder.skip("fourth");

    let statuses: Vec<StepStatus> = recorder.records().iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            StepStatus::Failed,
            StepStatus::Passed,
            StepStatus::Failed,
            StepStatus::Skipped
        ]
    );
    assert_eq!(recorder.records()[0].error.as_deref(), Some("title mismatch"));
    assert_eq!(recorder.records()[2].error.as_deref(), Some("boom"));
    assert!(recorder.records().iter().all(|r| r.end_time.is_some()));
}

#[test]
fn steps_file_tracks_final_statuses() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = JsonStepsWriter::new(&dir.path().join("json"), "Pay by card");
    let path = writer.path().to_path_buf();
    let mut recorder = StepRecorder::with_sink(Box::new(writer));

    let open = recorder.begin("open");
    recorder.end(open, Ok(()));
    let submit = recorder.begin("submit");

    let in_flight: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("written on begin")).unwrap();
    assert_eq!(in_flight["steps"][1]["status"], "unknown");

    recorder.end(submit, Err(&StepError::AssertionFailed("nope".into())));
    recorder.skip("confirm");

    let done: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(done["title"], "Pay by card");
    assert!(done["startTime"].as_u64().is_some());
    let statuses: Vec<&str> = done["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["passed", "failed", "skipped"]);
    assert_eq!(done["steps"][1]["error"], "nope");

    let file_name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("Pay_by_card-"), "{}", file_name);
    assert!(file_name.ends_with(".json"));
}

#[test]
fn steps_writer_ignores_unwritable_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();

    let mut writer = JsonStepsWriter::new(&blocker.join("json"), "x");
    writer.flush(&[record("open", StepStatus::Passed)]);

    assert!(!writer.path().exists());
}

#[test]
fn safe_name_replaces_unsafe_characters() {
    assert_eq!(safe_name("Login / Logout: v2.1"), "Login___Logout__v2.1");
    assert_eq!(safe_name("already-safe_name"), "already-safe_name");
    assert_eq!(safe_name(""), "scenario");
}

#[test]
fn log_file_is_named_by_date() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
    assert_eq!(log_file_name(date), "run-2026-03-07.log");
}
