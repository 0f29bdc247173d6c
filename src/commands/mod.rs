pub mod parse;
pub mod run;

pub use parse::execute_parse;
pub use run::{RunCommandArgs, execute_run};
