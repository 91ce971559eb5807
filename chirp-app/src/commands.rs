use crate::cli::{CleanArgs, FetchArgs};
use anyhow::{Context, Result};
use chirp_config::ChirpConfig;
use chirp_social::twitter::{FetchOptions, TEXT_COLUMN, TwitterApi};
use chirp_social::{Table, clean_column};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Run a search and return the table plus the column holding the text.
pub async fn fetch(cfg: &ChirpConfig, args: FetchArgs) -> Result<(Table, String)> {
    if !cfg.twitter.has_bearer_token() {
        tracing::warn!("no bearer token configured; the API will reject the request");
    }

    let api = TwitterApi::with_base_url(&cfg.twitter.base_url, cfg.twitter.bearer_token.clone())
        .context("failed to build twitter client")?
        .with_timeout(Duration::from_secs(cfg.twitter.timeout_secs));

    let opts = FetchOptions {
        clean: cfg.search.clean && !args.raw,
        count: args.count.unwrap_or(cfg.search.count),
    };

    let table = api
        .fetch(&args.query, opts)
        .await
        .with_context(|| format!("search for {:?} failed", args.query))?;
    Ok((table, TEXT_COLUMN.to_string()))
}

/// Clean a column of previously saved records.
pub fn clean(cfg: &ChirpConfig, args: CleanArgs) -> Result<(Table, String)> {
    let column = args.column.unwrap_or_else(|| cfg.search.column.clone());
    let raw = read_input(args.input.as_deref())?;
    let table = clean_records(&raw, &column)?;
    Ok((table, column))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn clean_records(raw: &str, column: &str) -> Result<Table> {
    let records: Vec<Map<String, Value>> =
        serde_json::from_str(raw).context("input must be a JSON array of objects")?;
    if records.is_empty() {
        return Ok(Table::new([column]));
    }
    let table = Table::from_records(records)?;
    Ok(clean_column(table, column)?)
}
