use anyhow::Result;
use clap::Args;
use clap_complete::Shell;
use std::io;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to emit a completion script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Print a completion script for `sift` covering every subcommand and the
/// global `--file`/`--replica`/`--config` flags. No snapshot or config is read.
///
/// # Errors
///
/// Does not currently fail.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> Result<()> {
    clap_complete::generate(shell, command, "sift", &mut io::stdout().lock());
    Ok(())
}

