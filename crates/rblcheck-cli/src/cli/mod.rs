//! CLI argument parsing and the check run.

pub mod args;

use anyhow::Result;
use args::Cli;
use std::io::IsTerminal;
use clap::Parser;
use rblcheck_core::{CheckOptions, ExitStatus, HickoryResolver, Orchestrator, RunTally};
use tracing::{debug, info};

use crate::config::{Config, Settings};
use crate::logging;
use crate::output::Reporter;

/// Run the CLI application.
///
/// Usage errors and help are handled here; the returned status becomes the
/// process exit code.
pub async fn run() -> Result<ExitStatus> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print()?;
            return Ok(if err.use_stderr() {
                ExitStatus::ConfigError
            } else {
                ExitStatus::Clean
            });
        }
    };

    if cli.no_color || !std::io::stderr().is_terminal() {
        colored::control::set_override(false);
    }
    logging::init(cli.log_level.as_deref())?;

    check(&cli).await
}

/// Check every target given on the command line.
pub async fn check(cli: &Cli) -> Result<ExitStatus> {
    let config = Config::for_cli(cli)?;
    let settings = Settings::merge(&config, cli)?;

    // Nothing is resolved before the zone list is known to be usable.
    settings.zones.ensure_configured()?;
    debug!(zones = settings.zones.count(), targets = cli.targets.len(), "starting run");

    let resolver = HickoryResolver::new(&settings.resolver)?;
    let options = CheckOptions {
        fetch_txt: settings.txt,
        stop_after_first_match: cli.first_match,
    };
    let checker = Orchestrator::new(&resolver, &settings.zones, options)?;

    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(
        stdout.lock(),
        settings.output_format,
        cli.verbosity(),
        settings.txt,
    );
    let mut write_error = None;
    let mut tally = RunTally::new();
    checker
        .run(cli.targets.iter().cloned(), &mut tally, |target| {
            if write_error.is_none() {
                if let Err(err) = reporter.report(target) {
                    write_error = Some(err);
                }
            }
        })
        .await;

    info!(
        listed = tally.listed(),
        failures = tally.failures(),
        "run complete"
    );

    if let Some(err) = write_error {
        return Err(anyhow::Error::new(err).context("unable to write results"));
    }
    Ok(tally.exit_status())
}
