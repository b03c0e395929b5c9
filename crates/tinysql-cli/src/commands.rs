//! CLI surface (spec §7 of `SPEC_FULL.md`): `tinysql <json-file> <query>
//! [--format table|json]`, restructured through `clap` derive the way the
//! teacher's `sqruff-cli-lib::commands` does for its own flags.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "tinysql")]
#[command(about = "A small embeddable SQL query engine over JSON tables", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// JSON file to load as the query's table.
    pub json_file: PathBuf,
    /// SQL query to execute against the loaded table.
    pub query: String,
    /// Output format.
    #[arg(short, long, default_value_t = Format::Table)]
    pub format: Format,
    /// Treat `json_file` as newline-delimited JSON (JSON Lines) and stream it
    /// lazily instead of loading the whole array eagerly.
    #[arg(long, default_value_t = false)]
    pub lines: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Table => write!(f, "table"),
            Format::Json => write!(f, "json"),
        }
    }
}
