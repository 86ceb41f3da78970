pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod parser;
pub mod report;
pub mod services;
pub mod timeline;

pub use error::{TimelineError, TimelineResult};
