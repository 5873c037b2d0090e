pub mod error;
pub mod locator;
pub mod page;
pub mod session;
