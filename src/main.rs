mod config;
mod dedup;
mod detector;
mod models;
mod notifier;
mod pipeline;
mod scraper;
mod storage;
mod summary;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::models::RunOutcome;
use crate::pipeline::Pipeline;
use crate::storage::{FileStateStore, StateStore};

#[derive(Parser)]
#[command(name = "tixwatch", about = "Ticket page availability monitor", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Probe and print the message without notifying or touching state;
    /// with reset-state, only report what would be cleared
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run one monitoring pass (default)
    Check,

    /// Print the stored fingerprint of the last notification
    State,

    /// Forget the last notification so the next change is reported
    ResetState,

    /// List the resolved targets and tracked sections
    Targets,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "tixwatch=info,warn",
        1 => "tixwatch=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => {
            let started = Instant::now();
            let pipeline = Pipeline::from_config(config)?;
            let report = pipeline.run(cli.dry_run).await;

            if let Some(digest) = &report.digest {
                match report.outcome {
                    RunOutcome::Notified | RunOutcome::NotifierDisabled | RunOutcome::DryRun => {
                        println!("{}", digest.message);
                    }
                    _ => {}
                }
                if report.outcome == RunOutcome::DryRun {
                    println!("\nfingerprint: {}", digest.fingerprint);
                }
            }

            info!(
                "Done: {} targets | {} failed | {} with tickets | {:?} (took {:.2?})",
                report.targets_checked,
                report.targets_failed,
                report.targets_available,
                report.outcome,
                started.elapsed(),
            );
        }

        Command::State => {
            let store = FileStateStore::new(&config.state.path);
            match store.load_fingerprint().await? {
                Some(f) => println!("{}  {}", f, store.path().display()),
                None => println!("(no state)  {}", store.path().display()),
            }
        }

        Command::ResetState => {
            let store = FileStateStore::new(&config.state.path);
            if reset_state(&store, cli.dry_run).await? {
                info!("Cleared {:?}", store.path());
            } else {
                info!("Dry run: would clear {:?}", store.path());
            }
        }

        Command::Targets => {
            for target in config.targets()? {
                println!("{}", target.url);
                println!("  {}", target.keywords.join(", "));
            }
            println!("tail_len: {}", config.probe.tail_len);
            println!("markers : {}", config.probe.sold_out_markers.join(", "));
        }
    }

    Ok(())
}

/// Clear the stored fingerprint unless `dry_run`. Returns whether the slot was touched.
async fn reset_state(store: &dyn StateStore, dry_run: bool) -> Result<bool> {
    if dry_run {
        return Ok(false);
    }
    store.clear().await?;
    Ok(true)
}
