//! Data-driven UI scenario runner.
//!
//! Scenarios are JSON documents of steps (action, selector, waits,
//! validations) interpreted against a live page behind [`browser::page::PageDriver`].

pub mod browser;
pub mod cli;
pub mod engine;
pub mod plugins;
pub mod report;
pub mod scenario;
pub mod trace;
