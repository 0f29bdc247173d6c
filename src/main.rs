use anyhow::Context;
use clap::Parser;
use jmeter_executor::{
    cli::{Cli, Commands},
    commands::{self, RunCommandArgs},
    config::RunnerConfig,
    telemetry::{TelemetryConfig, init_telemetry},
};

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _telemetry = init_telemetry(&TelemetryConfig::from_env());

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            execution,
            data_dir,
            output,
        } => {
            let config = RunnerConfig::from_env().context("loading runner configuration")?;
            commands::execute_run(
                RunCommandArgs {
                    execution_path: &execution,
                    data_dir,
                    output_path: output.as_deref(),
                },
                config,
            )
            .with_context(|| format!("running {}", execution.display()))?;
        }
        Commands::Parse { report, format } => {
            commands::execute_parse(&report, &format)
                .with_context(|| format!("parsing {}", report.display()))?;
        }
    }

    Ok(())
}
