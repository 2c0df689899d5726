#![forbid(unsafe_code)]

mod cmd;
mod output;
mod session;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use session::ConfigError;
use sift_core::config::{self, EffectiveConfig};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "sift: a checklist that merges cleanly across machines",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Snapshot file to operate on (overrides SIFT_FILE and config).
    #[arg(short, long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Replica id stamped on writes (overrides SIFT_REPLICA and config).
    #[arg(short, long, global = true, value_name = "NAME")]
    replica: Option<String>,

    /// Config file to read instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    const fn output_mode(&self) -> OutputMode {
        OutputMode::from_json_flag(self.json)
    }

    /// Combine the config file, environment and flags.
    fn effective_config(&self) -> Result<EffectiveConfig, ConfigError> {
        config::load_user_config(self.config.as_deref())
            .and_then(|file| {
                config::resolve_config(&file, self.replica.as_deref(), self.file.as_deref())
            })
            .map_err(ConfigError)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create a new snapshot",
        long_about = "Create a new, empty snapshot, optionally seeded with sample items.",
        after_help = "EXAMPLES:\n    # Start an empty list\n    sift init\n\n    # Start from the sample list with rational order keys\n    sift init --samples --keys rational\n\n    # Replace an existing snapshot\n    sift init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "List items",
        long_about = "List items in order. Removed items are hidden unless --all is given.",
        after_help = "EXAMPLES:\n    # List live items\n    sift list\n\n    # Include removed items\n    sift list --all\n\n    # Emit machine-readable output\n    sift list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one item",
        long_about = "Show one item with its order key and the last write of each field.",
        after_help = "EXAMPLES:\n    # Show an item by ID prefix\n    sift show 0190a5b2\n\n    # Emit machine-readable output\n    sift show 0190a5b2 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Add an item",
        long_about = "Add an item at the top of the list, or directly after another item.",
        after_help = "EXAMPLES:\n    # Add to the top\n    sift add \"buy milk\"\n\n    # Add right after another item\n    sift add \"buy eggs\" --after 0190a5b2"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Check or uncheck an item",
        after_help = "EXAMPLES:\n    # Flip an item\n    sift toggle 0190a5b2"
    )]
    Toggle(cmd::toggle::ToggleArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Rename an item",
        after_help = "EXAMPLES:\n    # Change a title\n    sift title 0190a5b2 \"buy oat milk\""
    )]
    Title(cmd::title::TitleArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Remove an item",
        long_about = "Remove an item. The item is kept as a tombstone so removal survives merges.",
        after_help = "EXAMPLES:\n    # Remove an item\n    sift remove 0190a5b2"
    )]
    Remove(cmd::remove::RemoveArgs),

    #[command(
        next_help_heading = "Sync",
        about = "Merge another replica's snapshot",
        long_about = "Merge another replica's snapshot into this one. The other file is not modified.",
        after_help = "EXAMPLES:\n    # Merge a copy from another machine\n    sift merge ~/Dropbox/laptop.json\n\n    # Emit machine-readable output\n    sift merge other.json --json"
    )]
    Merge(cmd::merge::MergeArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    sift completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SIFT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "sift=debug,info"
        } else {
            "sift=info,warn"
        })
    });

    let format = env::var("SIFT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let output = cli.output_mode();
    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &cli.effective_config()?, output),
        Commands::List(args) => cmd::list::run_list(args, &cli.effective_config()?, output),
        Commands::Show(args) => cmd::show::run_show(args, &cli.effective_config()?, output),
        Commands::Add(args) => cmd::add::run_add(args, &cli.effective_config()?, output),
        Commands::Toggle(args) => cmd::toggle::run_toggle(args, &cli.effective_config()?, output),
        Commands::Title(args) => cmd::title::run_title(args, &cli.effective_config()?, output),
        Commands::Remove(args) => cmd::remove::run_remove(args, &cli.effective_config()?, output),
        Commands::Merge(args) => cmd::merge::run_merge(args, &cli.effective_config()?, output),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::debug!(error = %format!("{err:#}"), "command failed");
            render_error(cli.output_mode(), &CliError::from_anyhow(&err))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::parse_from([
            "sift",
            "--file",
            "/tmp/list.json",
            "--replica",
            "laptop",
            "list",
        ]);
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/list.json")));
        assert_eq!(cli.replica.as_deref(), Some("laptop"));
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["sift", "list", "--json", "-f", "x.json", "-v"]);
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(cli.output_mode().is_json());
        assert_eq!(cli.file, Some(PathBuf::from("x.json")));
    }

    #[test]
    fn default_output_is_human() {
        let cli = Cli::parse_from(["sift", "list"]);
        assert!(!cli.output_mode().is_json());
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["sift", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["sift", "init"],
            vec!["sift", "init", "--samples", "--keys", "rational"],
            vec!["sift", "list", "--all"],
            vec!["sift", "show", "x"],
            vec!["sift", "add", "milk"],
            vec!["sift", "add", "milk", "--after", "x"],
            vec!["sift", "toggle", "x"],
            vec!["sift", "title", "x", "new"],
            vec!["sift", "remove", "x"],
            vec!["sift", "merge", "other.json"],
            vec!["sift", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn clap_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
