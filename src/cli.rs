use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bootstrap a Shortcut workspace from a declarative config, idempotently.
#[derive(Parser, Debug)]
#[command(
    name = "sc-bootstrap",
    version,
    after_help = "ENVIRONMENT:\n    SHORTCUT_TOKEN      API token (required for bootstrap)\n    SHORTCUT_API_BASE   API base URL [default: https://api.app.shortcut.com/api/v3]\n\nEXAMPLES:\n    sc-bootstrap --config workspace.yaml dry-run\n    sc-bootstrap --config workspace.yaml bootstrap"
)]
pub struct Cli {
    /// Path to the workspace config (YAML, or TOML by extension).
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,

    /// Append a JSON line per reconciled entity to this file.
    #[arg(long, value_name = "PATH", global = true)]
    pub journal: Option<PathBuf>,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create or update every configured entity.
    Bootstrap,
    /// Print what bootstrap would do without calling the API.
    DryRun,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("sc-bootstrap").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_bootstrap() {
        let cli = parse(&["--config", "ws.yaml", "bootstrap"]).unwrap();
        assert_eq!(cli.command, Command::Bootstrap);
        assert_eq!(cli.config, PathBuf::from("ws.yaml"));
        assert!(cli.journal.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_dry_run_with_short_flags() {
        let cli = parse(&["-c", "ws.yaml", "dry-run", "-v"]).unwrap();
        assert_eq!(cli.command, Command::DryRun);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_journal_after_subcommand() {
        let cli = parse(&["--config", "ws.yaml", "bootstrap", "--journal", "run.jsonl"]).unwrap();
        assert_eq!(cli.journal, Some(PathBuf::from("run.jsonl")));
    }

    #[test]
    fn config_is_required() {
        let err = parse(&["bootstrap"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(parse(&["--config", "ws.yaml", "teardown"]).is_err());
    }

    #[test]
    fn usage_errors_exit_with_two() {
        let err = parse(&["--config", "ws.yaml"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
