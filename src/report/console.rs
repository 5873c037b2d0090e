use crate::engine::recorder::StepStatus;
use crate::report::report_model::TestSuiteReport;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a suite report for the terminal.
///
/// ```text
/// === Test Suite: checkout ===
///
/// ✓ PASS  Add to cart (4 steps)
/// ✗ FAIL  Pay by card (2 of 5 steps)
///     [ERROR] Step 'Submit' requires a locator: ...
///     [SKIP]  Confirm
/// ✗ FAIL  Search results (6 steps)
///     [SOFT]  Check title [2/3]: expected '.title' to have text 'Shoes', got 'Boots'
///
/// === Results: 1 passed, 2 failed (3 total) in 4.2s ===
/// ```
pub fn format_console_report(report: &TestSuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Test Suite: {} ===\n\n", report.suite_name));

    for result in &report.results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };

        let skipped = result.steps.len() - result.steps_run;
        let steps = if skipped == 0 {
            format!("{} steps", result.steps_run)
        } else {
            format!("{} of {} steps", result.steps_run, result.steps.len())
        };
        out.push_str(&format!("{}  {} ({})\n", marker, result.description, steps));

        if let Some(ref error) = result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }

        for soft in &result.soft_failures {
            let label = match soft.iteration {
                Some(i) => format!("{} #{}", soft.step, i + 1),
                None => soft.step.clone(),
            };
            out.push_str(&format!("    [SOFT]  {}: {}\n", label, soft.message));
        }

        for record in result.steps.iter().filter(|r| r.status == StepStatus::Skipped) {
            out.push_str(&format!("    [SKIP]  {}\n", record.title));
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }

    out.push_str(" ===\n");
    out
}
