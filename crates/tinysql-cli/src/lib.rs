//! Library half of the `tinysql` binary: JSON table loading, output
//! formatting, CLI flags, and logging. Split from `main.rs` the way the
//! teacher splits `sqruff-cli-lib` from the `sqruff` binary, so the pieces
//! below are unit- and integration-testable without spawning a process.

pub mod commands;
pub mod format;
pub mod json_table;
mod logger;

use clap::Parser;

use commands::{Cli, Format};
use json_table::{JsonFileTable, JsonLinesTable};
use tinysql_core::table::Table;
use tinysql_core::Engine;

/// Catalog name every loaded table is registered under
/// (`original_source/main.go`/`cli/main.go`: `map[string]Table{"t": table}`).
pub const TABLE_NAME: &str = "t";
const TABLE_WIDTH: usize = 100;

/// Parses `args` as the CLI, runs the query, writes output to stdout, and
/// returns the process exit code (0 on success, 1 on any engine or I/O
/// error — it never panics on a malformed query or file).
pub fn run_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let _ = logger::init();
    let cli = Cli::parse_from(args);

    let table: Box<dyn Table> = if cli.lines {
        match JsonLinesTable::open(&cli.json_file) {
            Ok(t) => Box::new(t),
            Err(e) => return fail(&e),
        }
    } else {
        match JsonFileTable::load(&cli.json_file) {
            Ok(t) => Box::new(t),
            Err(e) => return fail(&e),
        }
    };

    let mut catalog = tinysql_helpers::IndexMap::default();
    catalog.insert(TABLE_NAME.to_string(), table);
    let engine = Engine::new(catalog);

    log::debug!("running query: {}", cli.query);
    let rows = match engine.exec_string(&cli.query) {
        Ok(rows) => rows,
        Err(e) => return fail(&e),
    };

    let output = match cli.format {
        Format::Table => format::format_table(&rows, TABLE_WIDTH),
        Format::Json => format::format_json(&rows),
    };
    print!("{output}");
    0
}

fn fail(err: &dyn std::fmt::Display) -> i32 {
    eprintln!("{err}");
    1
}
