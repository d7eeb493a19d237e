//! docstore CLI: drives the embedded document store from the shell.
//!
//! Subcommands:
//! - **demo**: family walkthrough (default when no subcommand is given)
//! - **query**: run a query against a container of a snapshot file
//! - **init-config**: write a default `docstore.toml`

mod commands;
mod demo;
mod family;
mod format;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use docstore_client::{ClientConfig, DocumentClient, CONFIG_FILE_NAME};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use demo::DemoOptions;
use format::{emit, format_error, OutputMode};

fn main() {
    let matches = build_cli().get_matches();

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("warn");
    init_tracing(log_level);

    if let Err(e) = run(&matches, mode) {
        eprintln!("{}", format_error(&e, mode));
        process::exit(1);
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(matches: &clap::ArgMatches, mode: OutputMode) -> anyhow::Result<()> {
    let data_dir = matches.get_one::<String>("data-dir").map(PathBuf::from);

    match matches.subcommand() {
        Some(("init-config", _)) => {
            let Some(dir) = data_dir else {
                bail!("init-config requires --data-dir");
            };
            let path = write_default_config(&dir)?;
            emit(
                mode,
                &format!("Config ready at {}", path.display()),
                json!({"path": path.display().to_string()}),
            );
            Ok(())
        }
        Some(("query", sub)) => {
            let config = load_config(data_dir.as_deref())?;
            let snapshot = PathBuf::from(required(sub, "snapshot")?);
            let container = required(sub, "container")?.to_string();
            let sql = required(sub, "sql")?.to_string();
            let max_items = sub.get_one::<usize>("max-items").copied();

            DocumentClient::scoped(config, |client| {
                run_query(client, &snapshot, &container, &sql, max_items, mode)
            })
            .with_context(|| format!("query against {} failed", snapshot.display()))
        }
        Some(("demo", sub)) => {
            let config = load_config(data_dir.as_deref())?;
            let options = DemoOptions {
                database: required(sub, "database")?.to_string(),
                container: required(sub, "container")?.to_string(),
                export: sub.get_one::<String>("export").map(PathBuf::from),
                keep: sub.get_flag("keep"),
            };
            run_demo(config, &options, mode)
        }
        Some((other, _)) => bail!("unknown command '{}'", other),
        None => {
            let config = load_config(data_dir.as_deref())?;
            run_demo(config, &DemoOptions::default(), mode)
        }
    }
}

fn run_demo(config: ClientConfig, options: &DemoOptions, mode: OutputMode) -> anyhow::Result<()> {
    info!(target: "docstore::cli", database = %options.database, keep = options.keep, "Running demo");
    emit(mode, "Beginning operations....", json!({}));
    let summary = DocumentClient::scoped(config, |client| demo::run(client, options, mode))
        .context("demo failed")?;
    emit(
        mode,
        &format!("End of demo, total charge {}", summary.total_charge),
        json!({
            "createdItems": summary.created_items,
            "queryMatches": summary.query_matches,
            "requestCharge": summary.total_charge.value()
        }),
    );
    Ok(())
}

fn run_query(
    client: &DocumentClient,
    snapshot: &Path,
    container: &str,
    sql: &str,
    max_items: Option<usize>,
    mode: OutputMode,
) -> docstore_client::Result<()> {
    let database = client.import_database_file(snapshot)?.into_resource();
    info!(target: "docstore::cli", database = %database.id(), path = %snapshot.display(), "Snapshot imported");
    let container = database.container(container)?;
    let mut feed = container.query_items_text::<serde_json::Value>(sql)?;
    if let Some(max_items) = max_items {
        feed = feed.with_max_item_count(max_items);
    }

    let mut page_number = 0;
    while feed.has_more_results() {
        let page = feed.read_next()?;
        page_number += 1;
        emit(
            mode,
            &format!("Page {}: {} items, {}", page_number, page.count(), page.request_charge()),
            json!({"page": page_number, "count": page.count(), "requestCharge": page.request_charge().value()}),
        );
        for body in page {
            emit(mode, &format!("\t{}", body), json!({ "document": body }));
        }
    }
    if page_number == 0 {
        emit(mode, "No results", json!({"count": 0}));
    }
    Ok(())
}

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing --{}", name))
}

fn write_default_config(dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(CONFIG_FILE_NAME);
    ClientConfig::write_default_if_missing(&path)?;
    Ok(path)
}

fn load_config(data_dir: Option<&Path>) -> anyhow::Result<ClientConfig> {
    match data_dir {
        Some(dir) => {
            let path = write_default_config(dir)?;
            ClientConfig::from_file(&path)
                .with_context(|| format!("failed to load {}", path.display()))
        }
        None => Ok(ClientConfig::default()),
    }
}
