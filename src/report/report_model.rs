use serde::{Deserialize, Serialize};

use crate::engine::runner::ScenarioResult;

// ============================================================================
// Suite report: aggregates ScenarioResult instances
// ============================================================================

/// Aggregated report for one run of many scenarios.
///
/// Consumed by the console, HTML, JUnit and JSON reporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteReport {
    pub suite_name: String,

    pub total: usize,

    pub passed: usize,

    pub failed: usize,

    /// Scenarios that passed their hard checks but logged soft failures
    pub soft_failed: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub results: Vec<ScenarioResult>,
}

impl TestSuiteReport {
    pub fn from_results(suite_name: &str, results: Vec<ScenarioResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let soft_failed = results
            .iter()
            .filter(|r| r.error.is_none() && !r.soft_failures.is_empty())
            .count();
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed: total - passed,
            soft_failed,
            duration_ms: None,
            results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Pretty-printed JSON rendition of the whole report.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
