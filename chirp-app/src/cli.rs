use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Search recent posts and clean their text.
#[derive(Debug, Parser)]
#[command(name = "chirp", version, about)]
pub struct Cli {
    /// Config file (YAML/TOML/JSON). Defaults to ./chirp.yaml and the user config dir.
    #[arg(long, short, global = true, env = "CHIRP_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, short, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Mirror logs to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query the recent search endpoint.
    Fetch(FetchArgs),
    /// Clean one column of a JSON array of records.
    Clean(CleanArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Search query, in the platform's query language.
    pub query: String,

    /// Number of posts to return, 5 to 100.
    #[arg(long, short = 'n')]
    pub count: Option<u32>,

    /// Skip text cleaning.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Column to clean.
    #[arg(long, short = 'C')]
    pub column: Option<String>,

    /// Input file; stdin when omitted.
    #[arg(long, short)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON array of records.
    Json,
    /// One line per row, value of the text column.
    Text,
}
