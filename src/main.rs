mod aggregate;
mod classify;
mod cli;
mod clock;
mod config;
mod counter;
mod enrichment;
mod error;
mod inventory;
mod model;
mod reconciler;
mod report;
mod retry;
mod timezone;
mod ui;

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use clock::SystemClock;
use config::{ReconcileConfig, RunConfig};
use enrichment::{CaseClient, Enricher};
use error::ReconcileError;
use inventory::{DEFAULT_PAGE_SIZE, SnapshotSource};
use reconciler::Reconciler;
use report::{Report, write_report};
use ui::RunProgress;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (snapshot, output, write) = match &cli.command {
        Command::Run { snapshot, output } => (snapshot.clone(), output.clone(), true),
        Command::Check { snapshot } => (snapshot.clone(), None, false),
        Command::Zones => {
            for (label, zone) in timezone::KNOWN_ZONES {
                println!("{label} -> {zone}");
            }
            return Ok(());
        }
    };

    let mut config = ReconcileConfig::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    if let Some(dir) = output {
        config.report.output_dir = dir;
    }
    let run = config.run_config()?;

    let source = SnapshotSource::load(&snapshot, DEFAULT_PAGE_SIZE)?;
    let enricher = connect_enricher(&config, &run).await?;
    let clock = SystemClock;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling run");
            on_signal.cancel();
        }
    });

    let progress = RunProgress::start(std::io::stderr().is_terminal() && !cli.verbose);
    let outcome = Reconciler::new(&run, &source, &source, &enricher, &clock)
        .with_progress(|name| progress.container(name))
        .run(&cancel)
        .await;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            progress.fail(&e.to_string());
            return Err(e.into());
        }
    };

    let report = Report::from_outcome(outcome, run.success_hours_threshold);
    progress.finish(&report);

    if write {
        let written = write_report(&report, &config.report)?;
        progress.written(&written);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "reconcile=debug" } else { "reconcile=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// CLI flags take precedence over the config file.
fn apply_overrides(config: &mut ReconcileConfig, cli: &Cli) {
    if let Some(threshold) = cli.threshold {
        config.success_hours_threshold = threshold;
    }
    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(delay) = cli.retry_delay {
        config.retry_delay_secs = delay;
    }
    if cli.offline {
        config.enrichment.enabled = false;
    }
}

async fn connect_enricher(
    config: &ReconcileConfig,
    run: &RunConfig,
) -> Result<Enricher<CaseClient>, ReconcileError> {
    if !run.lookups_enabled {
        info!(debug = run.debug, "case lookups disabled");
        return Ok(Enricher::Disabled);
    }

    let e = &config.enrichment;
    let client = CaseClient::connect(&e.base_url, &e.case_id, &e.username, &e.password)
        .await
        .map_err(|err| ReconcileError::Auth(err.to_string()))?;
    info!(base_url = %e.base_url, "authenticated against case system");
    Ok(Enricher::Enabled(client))
}
