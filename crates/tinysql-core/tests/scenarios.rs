//! End-to-end scenarios straight from the engine's design document: a small
//! catalog of in-memory tables, a query string, and the expected rows,
//! driven entirely through `Engine::exec_string`.

use pretty_assertions::assert_eq;

use tinysql_core::table::{MemoryTable, Table, TableRow};
use tinysql_core::value::Value;
use tinysql_core::Engine;

fn row(pairs: &[(&str, Value)]) -> TableRow {
    let mut r = TableRow::default();
    for (k, v) in pairs {
        r.insert((*k).to_string(), v.clone());
    }
    r
}

fn engine() -> Engine {
    let t1 = MemoryTable::new(
        vec!["id".into(), "name".into()],
        vec![
            row(&[("id", Value::Int(1)), ("name", Value::String("one".into()))]),
            row(&[("id", Value::Int(2)), ("name", Value::String("'".into()))]),
            row(&[("id", Value::Int(3)), ("name", Value::String("three".into()))]),
        ],
    );
    let t2 = MemoryTable::new(
        vec!["bucket".into()],
        vec![
            row(&[("bucket", Value::Int(1))]),
            row(&[("bucket", Value::Int(2))]),
            row(&[("bucket", Value::Int(2))]),
        ],
    );
    let t3 = MemoryTable::new(
        vec!["x".into()],
        vec![row(&[("x", Value::Int(1))]), row(&[("x", Value::Int(2))])],
    );

    let mut catalog: tinysql_helpers::IndexMap<String, Box<dyn Table>> = Default::default();
    catalog.insert("t1".into(), Box::new(t1));
    catalog.insert("t2".into(), Box::new(t2));
    catalog.insert("t3".into(), Box::new(t3));
    Engine::new(catalog)
}

/// Unaliased selectors project to a default name (spec §4.7 step 7): a
/// resolved column reference's own bare column name, or the expression's
/// stringified form for everything else (`count(*)`, `CAST(...)`, ...) —
/// these tests read by position rather than re-deriving that name.
fn values(rows: &[Vec<(String, Value)>]) -> Vec<Vec<Value>> {
    rows.iter().map(|r| r.iter().map(|(_, v)| v.clone()).collect()).collect()
}

#[test]
fn scenario_1_select_column_preserves_source_order() {
    let rows = engine().exec_string("SELECT name FROM t1").unwrap();
    let names: Vec<Value> = values(&rows).into_iter().map(|r| r[0].clone()).collect();
    assert_eq!(names, vec![Value::String("one".into()), Value::String("'".into()), Value::String("three".into())]);
}

#[test]
fn scenario_2_where_matches_escaped_quote() {
    let rows = engine().exec_string(r"SELECT id FROM t1 WHERE name = '\''").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].1, Value::Int(2));
}

#[test]
fn scenario_3_count_star() {
    let rows = engine().exec_string("SELECT count(*) FROM t1").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], ("count(*)".to_string(), Value::Int(3)));
}

#[test]
fn scenario_4_order_desc_limit() {
    let rows = engine().exec_string("SELECT id FROM t1 ORDER BY id DESC LIMIT 1").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].1, Value::Int(3));
}

#[test]
fn scenario_5_group_by_order_by_aggregate() {
    let rows = engine()
        .exec_string("SELECT bucket, count(*) FROM t2 GROUP BY bucket ORDER BY count(*) DESC")
        .unwrap();
    let pairs: Vec<(Value, Value)> = rows.iter().map(|r| (r[0].1.clone(), r[1].1.clone())).collect();
    assert_eq!(pairs, vec![(Value::Int(2), Value::Int(2)), (Value::Int(1), Value::Int(1))]);
}

#[test]
fn scenario_6_join() {
    let rows = engine().exec_string("SELECT * FROM t1 JOIN t2 ON id = bucket").unwrap();
    assert_eq!(rows.len(), 3);
    // star expands to t1's columns then t2's: id, name, bucket
    let ids: Vec<Value> = rows.iter().map(|r| r[0].1.clone()).collect();
    assert_eq!(ids, vec![Value::Int(1), Value::Int(2), Value::Int(2)]);
}

#[test]
fn scenario_7_substring_negative_indices() {
    let rows = engine().exec_string("SELECT SUBSTRING('back yard', -1, -4)").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].1, Value::String("yard".into()));
}

#[test]
fn scenario_8_subquery_from() {
    let rows = engine().exec_string("SELECT * FROM (SELECT x FROM t3)").unwrap();
    let xs: Vec<Value> = rows.iter().map(|r| r[0].1.clone()).collect();
    assert_eq!(xs, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn scenario_9_no_from_selects_one_literal_row() {
    let rows = engine().exec_string("SELECT 1").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], vec![("1".to_string(), Value::Int(1))]);
}

#[test]
fn negative_mixing_scalar_and_aggregate_without_group_by_errors() {
    assert!(engine().exec_string("SELECT id, count(*) FROM t1").is_err());
}

#[test]
fn negative_unknown_column_errors() {
    assert!(engine().exec_string("SELECT missing FROM t1").is_err());
}

#[test]
fn negative_unknown_join_table_errors() {
    assert!(engine().exec_string("SELECT * FROM t1 JOIN missing ON 1=1").is_err());
}

#[test]
fn negative_cross_type_comparison_errors() {
    assert!(engine().exec_string("SELECT 1 = 'a'").is_err());
}
