pub mod action;
pub mod driver;
pub mod error;
pub mod iteration;
pub mod plugins;
pub mod recorder;
pub mod runner;
pub mod runtime;
pub mod selector;
pub mod step;
pub mod validation;
