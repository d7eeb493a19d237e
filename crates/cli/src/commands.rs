//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("docstore")
        .about("Embeddable partitioned document store")
        .subcommand_required(false)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Directory holding docstore.toml (default: in-memory defaults)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log filter when RUST_LOG is unset (default: warn)")
                .default_value("warn")
                .global(true),
        )
        .subcommand(build_demo())
        .subcommand(build_query())
        .subcommand(build_init_config())
}

// =========================================================================
// demo
// =========================================================================

fn build_demo() -> Command {
    Command::new("demo")
        .about("Replay the family walkthrough: create, query, replace, delete")
        .arg(
            Arg::new("database")
                .long("database")
                .help("Database name")
                .default_value("FamilyDatabase"),
        )
        .arg(
            Arg::new("container")
                .long("container")
                .help("Container name")
                .default_value("FamilyContainer"),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .help("Write a snapshot of the database to this file before deleting it"),
        )
        .arg(
            Arg::new("keep")
                .long("keep")
                .help("Skip the delete steps at the end")
                .action(ArgAction::SetTrue),
        )
}

// =========================================================================
// query
// =========================================================================

fn build_query() -> Command {
    Command::new("query")
        .about("Run a query against a container of a snapshot file")
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .help("Snapshot file written by `demo --export`")
                .required(true),
        )
        .arg(
            Arg::new("container")
                .long("container")
                .help("Container to query")
                .required(true),
        )
        .arg(
            Arg::new("max-items")
                .long("max-items")
                .help("Page size")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("sql")
                .help("Query text, e.g. SELECT * FROM c WHERE c.lastName = 'Wakefield'")
                .required(true),
        )
}

// =========================================================================
// init-config
// =========================================================================

fn build_init_config() -> Command {
    Command::new("init-config")
        .about("Write a commented default docstore.toml into --data-dir")
}
