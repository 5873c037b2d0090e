use crate::engine::recorder::StepStatus;
use crate::report::report_model::TestSuiteReport;

// ============================================================================
// HTML reporter: self-contained page
// ============================================================================

/// Generate a self-contained HTML report: a header colored by overall
/// outcome, then one card per scenario with its step list, aborting error
/// and soft failures. CSS is inline.
pub fn generate_html_report(report: &TestSuiteReport) -> String {
    let (header_color, status_text) = if report.all_passed() {
        ("#4CAF50", "ALL SCENARIOS PASSED")
    } else {
        ("#f44336", "SOME SCENARIOS FAILED")
    };

    let duration_text = report
        .duration_ms
        .map(|ms| format!(" in {:.1}s", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cards = String::new();
    for result in &report.results {
        let (class, marker) = if result.passed {
            ("pass", "\u{2713}")
        } else {
            ("fail", "\u{2717}")
        };

        cards.push_str(&format!(
            "<div class=\"scenario {class}\">\n<h3>{marker} {name}</h3>\n<p>Steps run: {steps} | {ms} ms</p>\n",
            class = class,
            marker = marker,
            name = escape_html(&result.description),
            steps = result.steps_run,
            ms = result.duration_ms,
        ));

        if let Some(ref error) = result.error {
            cards.push_str(&format!("<p class=\"error\">Error: {}</p>\n", escape_html(error)));
        }

        if !result.steps.is_empty() {
            cards.push_str("<ol class=\"steps\">\n");
            for record in &result.steps {
                let status = match record.status {
                    StepStatus::Passed => "passed",
                    StepStatus::Failed => "failed",
                    StepStatus::Skipped => "skipped",
                    StepStatus::Unknown => "unknown",
                };
                cards.push_str(&format!(
                    "<li class=\"{status}\">{title} <span>{status}</span></li>\n",
                    status = status,
                    title = escape_html(&record.title),
                ));
            }
            cards.push_str("</ol>\n");
        }

        if !result.soft_failures.is_empty() {
            cards.push_str("<ul class=\"soft\">\n");
            for soft in &result.soft_failures {
                cards.push_str(&format!(
                    "<li>{}: {}</li>\n",
                    escape_html(&soft.step),
                    escape_html(&soft.message)
                ));
            }
            cards.push_str("</ul>\n");
        }

        cards.push_str("</div>\n");
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{suite_name} - Scenario Report</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f5f5f5; }}
.header {{ background: {header_color}; color: white; padding: 20px 30px; }}
.header h1 {{ margin: 0 0 8px 0; font-size: 24px; }}
.header p {{ margin: 0; font-size: 16px; opacity: 0.9; }}
.content {{ max-width: 900px; margin: 20px auto; padding: 0 20px; }}
.scenario {{ background: white; border-radius: 6px; padding: 16px 20px; margin-bottom: 12px; border-left: 4px solid #ccc; }}
.scenario.pass {{ border-left-color: #4CAF50; }}
.scenario.fail {{ border-left-color: #f44336; }}
.scenario h3 {{ margin: 0 0 8px 0; font-size: 16px; }}
.scenario p {{ margin: 4px 0; color: #666; font-size: 14px; }}
.scenario .error {{ color: #f44336; font-weight: bold; }}
.steps {{ font-size: 13px; padding-left: 20px; }}
.steps span {{ color: #999; font-size: 11px; text-transform: uppercase; }}
.steps .failed {{ color: #c62828; }}
.steps .skipped {{ color: #999; }}
.soft li {{ color: #ef6c00; font-size: 13px; }}
</style>
</head>
<body>
<div class="header">
<h1>{status_text}</h1>
<p>{suite_name}: {passed} passed, {failed} failed ({total} total){duration}</p>
</div>
<div class="content">
{cards}
</div>
</body>
</html>"##,
        suite_name = escape_html(&report.suite_name),
        header_color = header_color,
        status_text = status_text,
        passed = report.passed,
        failed = report.failed,
        total = report.total,
        duration = duration_text,
        cards = cards,
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
