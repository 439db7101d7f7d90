use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ldiff",
    about = "Compute LDIF modify records between directory entry snapshots",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with [format] and [encoding] tables
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the modify record turning one entry snapshot into another
    Diff(DiffArgs),
    /// Report malformed lines in an LDIF file
    Lint(LintArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct DiffArgs {
    /// JSON snapshot of the entry before the change
    pub before: PathBuf,
    /// JSON snapshot of the entry after the change
    pub after: PathBuf,
}

#[derive(Args)]
pub struct LintArgs {
    /// LDIF file to check
    pub file: PathBuf,
}
