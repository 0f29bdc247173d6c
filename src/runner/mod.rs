//! Test runners for executing JMeter test plans
//!
//! A runner takes an execution from the orchestrator, runs the external tool
//! and returns a normalized [`ExecutionResult`].

pub mod jmeter;
pub mod mapper;
pub mod process;

pub use jmeter::JMeterRunner;
pub use mapper::{map_results, map_status};
pub use process::{ProcessInvoker, ProcessOutput, SystemProcess};

use crate::error::Result;
use crate::models::{Execution, ExecutionResult};

/// Trait for test runners
pub trait Runner {
    /// Run a single execution. Fatal errors return `Err`; test failures and
    /// other recoverable problems are reported inside the result.
    fn run(&self, execution: Execution) -> Result<ExecutionResult>;
}
