use std::collections::HashMap;

use crate::browser::locator::Locator;
use crate::browser::page::PageDriver;
use crate::engine::error::StepError;
use crate::scenario::context::ExecutionContext;
use crate::scenario::scenario_model::{Step, Validation};

/// Custom action: `(page, step, context, element?)`. Fails by returning `Err`.
pub type ActionHandler = Box<
    dyn Fn(&mut dyn PageDriver, &Step, &ExecutionContext, Option<&Locator>) -> Result<(), StepError>
        + Send
        + Sync,
>;

/// Custom validation: `(page, validation, context, element?)`.
pub type ValidationHandler = Box<
    dyn Fn(&mut dyn PageDriver, &Validation, &ExecutionContext, Option<&Locator>) -> Result<(), StepError>
        + Send
        + Sync,
>;

/// Named handlers behind `action: "custom"` and `type: "custom"`.
///
/// Populated at startup and only read afterwards, so one registry can be
/// shared by scenarios running on different threads.
#[derive(Default)]
pub struct PluginRegistry {
    actions: HashMap<String, ActionHandler>,
    validations: HashMap<String, ValidationHandler>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_action<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut dyn PageDriver, &Step, &ExecutionContext, Option<&Locator>) -> Result<(), StepError>
            + Send
            + Sync
            + 'static,
    {
        self.actions.insert(name.into(), Box::new(handler));
        self
    }

    pub fn register_validation<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut dyn PageDriver, &Validation, &ExecutionContext, Option<&Locator>) -> Result<(), StepError>
            + Send
            + Sync
            + 'static,
    {
        self.validations.insert(name.into(), Box::new(handler));
        self
    }

    pub fn action(&self, name: &str) -> Result<&ActionHandler, StepError> {
        self.actions
            .get(name)
            .ok_or_else(|| StepError::PluginNotFound(name.to_string()))
    }

    pub fn validation(&self, name: &str) -> Result<&ValidationHandler, StepError> {
        self.validations
            .get(name)
            .ok_or_else(|| StepError::PluginNotFound(name.to_string()))
    }

    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn validation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
