use clap::{Args, Parser, Subcommand};
use recall_core::Difficulty;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "recall", version, about = "Recall memory-training CLI/TUI")]
pub struct Cli {
    /// Config file (defaults to the app config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Card data file (overrides the config file)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Review the cards that are due now
    Review(FilterArgs),
    /// List the cards that are due now
    Due(FilterArgs),
    /// List cards
    List(ListCmd),
    /// Collection statistics
    Stats,
    /// Restore every card to its never-reviewed state
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Export cards
    #[command(subcommand)]
    Export(ExportCmd),
    /// Import cards
    #[command(subcommand)]
    Import(ImportCmd),
    /// Launch Terminal UI
    Tui(FilterArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Args, Clone)]
pub struct ListCmd {
    #[arg(long)]
    pub query: Option<String>,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ExportCmd {
    Json { path: PathBuf },
    Csv { path: PathBuf },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ImportCmd {
    /// Full records, review state included
    Json { path: PathBuf },
    /// id,prompt,answer,category,difficulty,source; imported unreviewed
    Csv { path: PathBuf },
}
