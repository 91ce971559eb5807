use anyhow::{Context, Result};
use chirp_common::observability::{LogConfig, init_logging};
use chirp_config::{ChirpConfig, ChirpConfigLoader};
use clap::Parser;
use cli::{Cli, Command};
use std::io::Write;

mod cli;
mod commands;
mod output;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over files)
    let loader = match &cli.config {
        Some(path) => ChirpConfigLoader::new().with_file(path),
        None => ChirpConfigLoader::new().with_default_files(),
    };
    let cfg: ChirpConfig = loader.load().context("failed to load configuration")?;

    // 2) Logging
    let log_file = init_logging(LogConfig {
        app_name: "chirp",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr || cli.verbose,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    tracing::debug!(log_file = %log_file.display(), "logging initialised");

    // 3) Run
    let (table, column) = match cli.command {
        Command::Fetch(args) => commands::fetch(&cfg, args).await?,
        Command::Clean(args) => commands::clean(&cfg, args)?,
    };

    let rendered = output::render(&table, cli.format, &column)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
