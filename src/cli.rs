use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jmeter-executor")]
#[command(version)]
#[command(
    about = "Runs JMeter test plans and reports normalized execution results",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an execution and print its result as JSON
    Run {
        /// Execution document (JSON or YAML)
        #[arg(short, long)]
        execution: PathBuf,

        /// Data directory override (defaults to RUNNER_DATADIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Output file for the result (stdout if not specified)
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },

    /// Parse a JTL report and show the mapped steps
    Parse {
        /// Path to the JTL report (XML or CSV)
        #[arg(short, long)]
        report: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    /// Colored step table
    Table,
    /// Execution result JSON
    Json,
}
