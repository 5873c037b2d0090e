use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

pub const ITERATION_INDEX: &str = "iterationIndex";
pub const TOTAL_ITERATIONS: &str = "totalIterations";

/// Free-form values threaded through a scenario run.
///
/// Immutable per scope: entering an iteration produces a copy extended with
/// the iteration fields, so the outer scope never sees them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionContext {
    values: BTreeMap<String, Value>,
}

/// Position inside a grouped or fanned-out iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationScope {
    pub index: usize,
    pub total: usize,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Copy of this context with `key` set to `value`.
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut values = self.values.clone();
        values.insert(key.into(), value.into());
        Self { values }
    }

    /// Copy of this context carrying `{iterationIndex, totalIterations}`.
    pub fn with_iteration(&self, index: usize, total: usize) -> Self {
        self.with(ITERATION_INDEX, index).with(TOTAL_ITERATIONS, total)
    }

    pub fn iteration(&self) -> Option<IterationScope> {
        let index = self.values.get(ITERATION_INDEX)?.as_u64()? as usize;
        let total = self.values.get(TOTAL_ITERATIONS)?.as_u64()? as usize;
        Some(IterationScope { index, total })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
