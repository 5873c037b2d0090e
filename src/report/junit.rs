use crate::report::report_model::TestSuiteReport;

const CLASSNAME: &str = "ui-scenario-runner";

// ============================================================================
// JUnit XML reporter: CI integration format
// ============================================================================

/// Generate JUnit XML, one `testcase` per scenario.
///
/// A failing scenario carries one `failure` element whose body lists the
/// aborting error and every soft failure:
/// ```xml
/// <testsuite name="checkout" tests="2" failures="1" time="3.100">
///   <testcase name="Add to cart" classname="ui-scenario-runner" time="1.200" />
///   <testcase name="Pay by card" classname="ui-scenario-runner" time="1.900">
///     <failure message="2 soft failure(s)" type="SoftAssertionFailure">...</failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &TestSuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.results {
        let name = escape_xml(&result.description);
        let time = format!("{:.3}", result.duration_ms as f64 / 1000.0);

        if result.passed {
            cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"{}\" time=\"{}\" />\n",
                name, CLASSNAME, time
            ));
            continue;
        }

        let mut body: Vec<String> = Vec::new();
        if let Some(ref error) = result.error {
            body.push(format!("Error: {}", error));
        }
        body.extend(result.soft_failures.iter().map(|f| match f.iteration {
            Some(i) => format!("{} (iteration {}): {}", f.step, i + 1, f.message),
            None => format!("{}: {}", f.step, f.message),
        }));

        let (message, kind) = match &result.error {
            Some(error) => (error.clone(), "StepFailure"),
            None => (
                format!("{} soft failure(s)", result.soft_failures.len()),
                "SoftAssertionFailure",
            ),
        };

        cases.push_str(&format!(
            "  <testcase name=\"{name}\" classname=\"{class}\" time=\"{time}\">\n    <failure message=\"{message}\" type=\"{kind}\">{body}</failure>\n  </testcase>\n",
            name = name,
            class = CLASSNAME,
            time = time,
            message = escape_xml(&message),
            kind = kind,
            body = escape_xml(&body.join("\n")),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
