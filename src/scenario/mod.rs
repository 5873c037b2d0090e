pub mod context;
pub mod error;
pub mod loader;
pub mod scenario_model;
