pub mod cli;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod loader;
pub mod models;
pub mod report;
pub mod runner;
pub mod scraper;
pub mod telemetry;
pub mod variables;

pub use error::{ExecutorError, Result};
