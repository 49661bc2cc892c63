mod api;
mod bootstrap;
mod cli;
mod config;
mod error;
mod journal;
mod model;
mod reconcile;
mod util;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::shortcut::ShortcutClient;
use bootstrap::{Bootstrapper, Mode, Summary};
use cli::{Cli, Command};
use config::{ApiSettings, DesiredState};
use error::BootstrapResult;
use journal::Journal;

/// Exit status for every fatal condition.
const FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli, |key| std::env::var(key).ok()).await;
    if let Err(e) = &result {
        eprintln!("ERROR: {e:#}");
    }
    ExitCode::from(exit_status(&result))
}

fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => FAILURE,
    }
}

/// API settings for commands that talk to the service; dry-run never needs them.
fn settings_for(
    command: Command,
    env: impl Fn(&str) -> Option<String>,
) -> BootstrapResult<Option<ApiSettings>> {
    match command {
        Command::Bootstrap => ApiSettings::from_lookup(env).map(Some),
        Command::DryRun => Ok(None),
    }
}

async fn run(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Result<()> {
    // Credentials are checked before anything else.
    let settings = settings_for(cli.command, env)?;

    let state = config::load_config(&cli.config)?;
    let journal = cli.journal.as_deref().map(Journal::new);

    let summary = match settings {
        Some(settings) => {
            let client = ShortcutClient::new(settings)?;
            execute(Mode::Live(&client), journal, &state).await?
        }
        None => execute(Mode::DryRun, journal, &state).await?,
    };

    info!(
        projects = summary.projects,
        milestones = summary.milestones,
        epics = summary.epics,
        iterations = summary.iterations,
        stories = summary.stories,
        tasks = summary.tasks,
        "Run complete"
    );
    Ok(())
}

async fn execute(
    mode: Mode<'_>,
    journal: Option<Journal>,
    state: &DesiredState,
) -> BootstrapResult<Summary> {
    let mut bootstrapper = Bootstrapper::new(mode, io::stdout()).with_journal(journal);
    let summary = bootstrapper.run(state).await?;
    Ok(summary)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sc_bootstrap=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
