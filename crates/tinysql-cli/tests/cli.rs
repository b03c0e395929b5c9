//! Black-box-style smoke tests around the JSON loader + engine + formatter
//! pipeline, driven through `tinysql_cli`'s public modules as direct
//! function calls rather than spawning the built binary as a subprocess.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use tinysql_cli::json_table::JsonFileTable;
use tinysql_core::table::Table;
use tinysql_core::{Engine, Value};

fn temp_json(contents: &str) -> std::path::PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!("tinysql-cli-smoke-{}-{n}.json", std::process::id()));
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

fn engine_over(path: &std::path::Path) -> Engine {
    let table: Box<dyn Table> = Box::new(JsonFileTable::load(path).unwrap());
    let mut catalog = tinysql_helpers::IndexMap::default();
    catalog.insert(tinysql_cli::TABLE_NAME.to_string(), table);
    Engine::new(catalog)
}

#[test]
fn loads_json_array_and_runs_a_query() {
    let path = temp_json(r#"[{"id": 1, "name": "one"}, {"id": 2, "name": "two"}]"#);
    let engine = engine_over(&path);
    let rows = engine.exec_string("SELECT name FROM t WHERE id = 2").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].1, Value::String("two".into()));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn table_formatter_renders_header_and_border() {
    let path = temp_json(r#"[{"id": 1}]"#);
    let engine = engine_over(&path);
    let rows = engine.exec_string("SELECT id FROM t").unwrap();
    let out = tinysql_cli::format::format_table(&rows, 80);
    assert!(out.contains("id"));
    assert!(out.starts_with("+ "));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn json_formatter_emits_one_line_per_row() {
    let path = temp_json(r#"[{"id": 1}, {"id": 2}]"#);
    let engine = engine_over(&path);
    let rows = engine.exec_string("SELECT id FROM t ORDER BY id").unwrap();
    let out = tinysql_cli::format::format_json(&rows);
    assert_eq!(out.lines().count(), 2);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn malformed_query_fails_gracefully_as_an_error_not_a_panic() {
    let path = temp_json(r#"[{"id": 1}]"#);
    let engine = engine_over(&path);
    assert!(engine.exec_string("SELECT FROM").is_err());
    let _ = std::fs::remove_file(&path);
}
