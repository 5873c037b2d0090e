use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::engine::error::StepError;

/// Lifecycle status of one recorded step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Skipped,
    /// Begun but not finished yet
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub title: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub start_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u64>,
}

/// A soft validation that failed without aborting its step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftFailure {
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<usize>,
    pub message: String,
}

/// Receives the full record list every time a step begins or ends.
pub trait StepSink {
    fn flush(&mut self, records: &[StepRecord]);
}

/// Returned by [`StepRecorder::begin`], consumed by [`StepRecorder::end`].
#[derive(Debug, Clone, Copy)]
pub struct StepHandle {
    index: usize,
    soft_mark: usize,
}

/// Collects step lifecycle records and soft failures for one scenario.
#[derive(Default)]
pub struct StepRecorder {
    records: Vec<StepRecord>,
    soft_failures: Vec<SoftFailure>,
    sink: Option<Box<dyn StepSink + Send>>,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: Box<dyn StepSink + Send>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::default()
        }
    }

    pub fn begin(&mut self, title: impl Into<String>) -> StepHandle {
        self.records.push(StepRecord {
            title: title.into(),
            status: StepStatus::Unknown,
            error: None,
            start_time: now_ms(),
            end_time: None,
        });
        self.flush();
        StepHandle {
            index: self.records.len() - 1,
            soft_mark: self.soft_failures.len(),
        }
    }

    /// Close a step. Soft failures recorded since `begin` fail it too.
    pub fn end(&mut self, handle: StepHandle, outcome: Result<(), &StepError>) {
        let soft: Vec<&str> = self.soft_failures[handle.soft_mark..]
            .iter()
            .map(|f| f.message.as_str())
            .collect();
        let (status, error) = match outcome {
            Err(e) => (StepStatus::Failed, Some(e.to_string())),
            Ok(()) if !soft.is_empty() => (StepStatus::Failed, Some(soft.join("; "))),
            Ok(()) => (StepStatus::Passed, None),
        };
        if let Some(record) = self.records.get_mut(handle.index) {
            record.status = status;
            record.error = error;
            record.end_time = Some(now_ms());
        }
        self.flush();
    }

    pub fn skip(&mut self, title: impl Into<String>) {
        let now = now_ms();
        self.records.push(StepRecord {
            title: title.into(),
            status: StepStatus::Skipped,
            error: None,
            start_time: now,
            end_time: Some(now),
        });
        self.flush();
    }

    pub fn soft_failure(&mut self, step: &str, iteration: Option<usize>, message: String) {
        self.soft_failures.push(SoftFailure {
            step: step.to_string(),
            iteration,
            message,
        });
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn soft_failures(&self) -> &[SoftFailure] {
        &self.soft_failures
    }

    pub fn into_parts(self) -> (Vec<StepRecord>, Vec<SoftFailure>) {
        (self.records, self.soft_failures)
    }

    fn flush(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush(&self.records);
        }
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
