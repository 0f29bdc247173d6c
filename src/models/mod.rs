pub mod execution;
pub mod result;

pub use execution::{ContentType, Execution, Repository, TestContent, Variable, VariableType};
pub use result::{OUTPUT_TYPE_TEXT, AssertionResult, ExecutionResult, ExecutionStatus, StepResult};
