pub mod console;
pub mod html;
pub mod json_steps;
pub mod junit;
pub mod report_model;
