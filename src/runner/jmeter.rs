//! JMeter runner implementation
//!
//! Resolves the test plan, runs JMeter in non-GUI mode, parses the JTL report
//! and maps it to an execution result. Artifacts are scraped afterwards when
//! enabled, even if the test itself failed.

use super::Runner;
use super::mapper::map_results;
use super::process::{ProcessInvoker, SystemProcess};
use crate::config::RunnerConfig;
use crate::content::{ContentResolver, ResolvedRun};
use crate::error::{ExecutorError, Result};
use crate::models::{Execution, ExecutionResult};
use crate::report::{self, ParseOutcome};
use crate::scraper::{ArtifactMeta, Scraper};
use crate::variables::VariableSet;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

pub struct JMeterRunner<P: ProcessInvoker = SystemProcess> {
    config: RunnerConfig,
    process: P,
    scraper: Option<Scraper>,
}

impl JMeterRunner<SystemProcess> {
    pub fn new(config: RunnerConfig) -> Result<Self> {
        Self::with_process(config, SystemProcess)
    }
}

impl<P: ProcessInvoker> JMeterRunner<P> {
    /// Create a runner invoking JMeter through `process`. The scraper is set
    /// up from the configured uploader when scraping is enabled.
    pub fn with_process(config: RunnerConfig, process: P) -> Result<Self> {
        let scraper = if config.scraper_enabled {
            Some(Scraper::new(config.uploader()?))
        } else {
            None
        };

        Ok(Self {
            config,
            process,
            scraper,
        })
    }

    /// Replace the scraper chosen from the configuration.
    pub fn with_scraper(mut self, scraper: Scraper) -> Self {
        self.scraper = Some(scraper);
        self
    }
}

impl<P: ProcessInvoker> Runner for JMeterRunner<P> {
    #[tracing::instrument(name = "jmeter_run", skip_all, fields(execution_id = %execution.id))]
    fn run(&self, execution: Execution) -> Result<ExecutionResult> {
        tracing::info!(
            data_dir = %self.config.data_dir.display(),
            scraper_enabled = self.config.scraper_enabled,
            cloud_mode = self.config.cloud_mode,
            "Running with config"
        );

        let execution =
            execution.with_git_credentials(&self.config.git_username, &self.config.git_token);
        let variables = VariableSet::new(execution.variables.clone())?;

        let resolver = ContentResolver::new(&self.config.data_dir)?;
        let run = resolver.resolve(execution.content.as_ref(), &execution.args)?;
        tracing::info!(script = %run.script_path.display(), "Resolved test plan");

        let output_dir = run.output_dir();
        recreate_output_dir(&output_dir)?;

        let args = compose_args(&run, &variables);
        tracing::debug!(
            args = %variables.obfuscate_str(&args.join(" ")),
            "Using arguments"
        );

        let process = self.process.run(
            &run.working_dir,
            &self.config.jmeter_binary,
            &variables,
            &args,
        );
        let output = variables.obfuscate(&process.output);
        let process_error = process.error.map(ExecutorError::ProcessInvocation);

        let report_path = run.report_path();
        tracing::info!(report = %report_path.display(), "Getting report");

        let result = match (read_report(&report_path), process_error) {
            (Ok(outcome), None) => map_results(&output, &outcome),
            (Ok(outcome), Some(err)) => {
                tracing::warn!(error = %err, "JMeter exited with an error, using its report");
                map_results(&output, &outcome).with_error(err)
            }
            (Err(ExecutorError::ReportAccess { .. }), Some(err)) => {
                tracing::warn!(error = %err, "JMeter failed without writing a report");
                ExecutionResult::failed(String::from_utf8_lossy(&output), err)
            }
            (Err(err), Some(process_err)) => {
                tracing::warn!(error = %process_err, "JMeter exited with an error");
                return Err(err);
            }
            (Err(err), None) => return Err(err),
        };
        tracing::info!(
            status = %result.status,
            steps = result.steps.len(),
            "Mapped JMeter results to execution result"
        );

        let Some(scraper) = &self.scraper else {
            return Ok(result);
        };

        tracing::info!(directory = %output_dir.display(), "Scraping directories");
        match scraper.scrape(&[output_dir], &ArtifactMeta::from(&execution)) {
            Ok(()) => Ok(result),
            Err(err) => {
                tracing::warn!(error = %err, "Error encountered while scraping artifacts");
                Ok(result.with_error(err))
            }
        }
    }
}

/// Arguments for a non-GUI run: test plan, JTL log, HTML dashboard, then
/// `-J` properties in declaration order and the execution arguments last.
pub fn compose_args(run: &ResolvedRun, variables: &VariableSet) -> Vec<String> {
    let mut args = vec![
        "-n".to_string(),
        "-t".to_string(),
        run.script_path.display().to_string(),
        "-l".to_string(),
        run.report_path().display().to_string(),
        "-e".to_string(),
        "-o".to_string(),
        run.dashboard_dir().display().to_string(),
    ];
    args.extend(variables.jmeter_properties());
    args.extend(run.args.iter().cloned());
    args
}

/// Remove the output directory and create it again, empty and world-writable
/// so JMeter can write there when running as another user.
pub fn recreate_output_dir(path: &Path) -> Result<()> {
    if path.exists()
        && let Err(e) = fs::remove_dir_all(path)
    {
        tracing::warn!(directory = %path.display(), error = %e, "Failed to clean output directory");
    }

    let create = |source| ExecutorError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(path).map_err(create)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o777)).map_err(create)?;
    }

    Ok(())
}

pub fn read_report(path: &Path) -> Result<ParseOutcome> {
    let file = File::open(path).map_err(|source| ExecutorError::ReportAccess {
        path: path.to_path_buf(),
        source,
    })?;

    report::parse(BufReader::new(file))
}
