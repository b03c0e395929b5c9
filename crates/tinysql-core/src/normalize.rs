//! Normalizer (spec §4.3): resolves table/column names case-insensitively
//! against the catalog, expands `*` selectors, and canonicalizes
//! identifiers. Runs once after parsing, before execution; the executor
//! that follows is purely mechanical.

use tinysql_helpers::IndexMap;

use crate::ast::{Expr, From, Query, Selector};
use crate::error::{Error, ResolveError};
use crate::table::Table;

/// A table referenced at the current query nesting level: either a real
/// catalog table (resolved to its canonical name) or the synthetic,
/// unnamed table formed by a `FROM (subquery)` clause.
struct ReferencedTable {
    name: String,
    columns: Vec<String>,
}

/// Resolves every name in `query` against `catalog`, mutating the AST in
/// place. `catalog` order is what `*` expansion treats as "declared order"
/// across tables; within one table, expansion follows that table's own
/// `column_names()` order.
pub fn normalize(query: &mut Query, catalog: &IndexMap<String, Box<dyn Table>>) -> Result<(), Error> {
    let mut referenced = Vec::new();

    match &mut query.from {
        From::Absent => {}
        From::Table(name) => {
            let canonical = canonical_table_name(catalog, name)?;
            let columns = catalog.get(&canonical).expect("just resolved").column_names();
            referenced.push(ReferencedTable {
                name: canonical.clone(),
                columns,
            });
            *name = canonical;
        }
        From::Subquery(inner) => {
            normalize(inner, catalog)?;
            let columns = inner.selectors.iter().map(Selector::output_name).collect();
            referenced.push(ReferencedTable {
                name: String::new(),
                columns,
            });
        }
    }

    for join in &mut query.joins {
        let canonical = canonical_table_name(catalog, &join.table)?;
        let columns = catalog.get(&canonical).expect("just resolved").column_names();
        referenced.push(ReferencedTable {
            name: canonical.clone(),
            columns,
        });
        join.table = canonical;
    }

    expand_stars(&mut query.selectors, &referenced);

    for selector in &mut query.selectors {
        resolve_expr(&mut selector.expr, &referenced)?;
    }
    if let Some(filter) = &mut query.filter {
        resolve_expr(filter, &referenced)?;
    }
    for join in &mut query.joins {
        resolve_expr(&mut join.condition, &referenced)?;
    }
    for g in &mut query.group_by {
        resolve_expr(g, &referenced)?;
    }
    for o in &mut query.order_by {
        resolve_expr(&mut o.expr, &referenced)?;
    }

    Ok(())
}

fn expand_stars(selectors: &mut Vec<Selector>, referenced: &[ReferencedTable]) {
    let mut expanded = Vec::with_capacity(selectors.len());
    for selector in selectors.drain(..) {
        if selector.expr != Expr::Star {
            expanded.push(selector);
            continue;
        }
        for table in referenced {
            for column in &table.columns {
                expanded.push(Selector {
                    expr: Expr::ColumnRef {
                        table: table.name.clone(),
                        column: column.clone(),
                    },
                    alias: None,
                });
            }
        }
    }
    *selectors = expanded;
}

fn resolve_expr(expr: &mut Expr, referenced: &[ReferencedTable]) -> Result<(), Error> {
    match expr {
        Expr::Value(_) | Expr::Star => Ok(()),
        Expr::ColumnRef { table, column } => {
            let (t, c) = canonical_column_name(referenced, table, column)?;
            *table = t;
            *column = c;
            Ok(())
        }
        Expr::Aggregate { args, .. } | Expr::Function { args, .. } => {
            for a in args {
                resolve_expr(a, referenced)?;
            }
            Ok(())
        }
        Expr::BinaryOp { left, right, .. } | Expr::Or { left, right } => {
            resolve_expr(left, referenced)?;
            resolve_expr(right, referenced)?;
            Ok(())
        }
        Expr::Cast { expr, .. } => resolve_expr(expr, referenced),
    }
}

fn canonical_table_name(catalog: &IndexMap<String, Box<dyn Table>>, name: &str) -> Result<String, Error> {
    let matches: Vec<&String> = catalog.keys().filter(|t| id_match(t, name)).collect();
    match matches.len() {
        0 => Err(ResolveError::UnknownTable { name: name.to_string() }.into()),
        1 => Ok(matches[0].clone()),
        _ => Err(ResolveError::AmbiguousTable {
            name: name.to_string(),
            matches: matches.into_iter().cloned().collect(),
        }
        .into()),
    }
}

fn canonical_column_name(
    referenced: &[ReferencedTable],
    table: &str,
    column: &str,
) -> Result<(String, String), Error> {
    let mut matches = Vec::new();
    for t in referenced {
        if !table.is_empty() && !id_match(&t.name, table) {
            continue;
        }
        for c in &t.columns {
            if id_match(c, column) {
                matches.push((t.name.clone(), c.clone()));
            }
        }
    }
    match matches.len() {
        0 => Err(ResolveError::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
        .into()),
        1 => Ok(matches.into_iter().next().unwrap()),
        _ => Err(ResolveError::AmbiguousColumn {
            table: table.to_string(),
            column: column.to_string(),
            matches,
        }
        .into()),
    }
}

/// Namespaced-identifier matching: a table name containing `/` (e.g.
/// `ns/short`) matches a one-part reference against its suffix, and a
/// two-part reference against both parts; otherwise plain case-insensitive
/// equality. Preserved verbatim from the product convention (spec §4.3,
/// §9).
fn id_match(full: &str, x: &str) -> bool {
    if full.contains('/') {
        return ns_match(full, x);
    }
    full.eq_ignore_ascii_case(x)
}

fn ns_match(full: &str, x: &str) -> bool {
    let full_parts: Vec<&str> = full.splitn(2, '/').collect();
    let x_parts: Vec<&str> = x.splitn(2, '/').collect();
    match x_parts.len() {
        1 => x_parts[0].eq_ignore_ascii_case(full_parts[1]),
        _ => x_parts[0].eq_ignore_ascii_case(full_parts[0]) && x_parts[1].eq_ignore_ascii_case(full_parts[1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::table::MemoryTable;
    use crate::value::Value;

    fn catalog() -> IndexMap<String, Box<dyn Table>> {
        let mut cat: IndexMap<String, Box<dyn Table>> = IndexMap::default();
        cat.insert(
            "t1".into(),
            Box::new(MemoryTable::new(vec!["id".into(), "name".into()], vec![])),
        );
        cat.insert(
            "ns/short".into(),
            Box::new(MemoryTable::new(vec!["x".into()], vec![])),
        );
        cat
    }

    #[test]
    fn resolves_case_insensitive_table_and_column() {
        let mut q = parse("select ID from T1").unwrap();
        normalize(&mut q, &catalog()).unwrap();
        assert_eq!(q.from, From::Table("t1".into()));
        assert_eq!(
            q.selectors[0].expr,
            Expr::ColumnRef {
                table: "t1".into(),
                column: "id".into()
            }
        );
    }

    #[test]
    fn unknown_table_errors() {
        let mut q = parse("select x from missing").unwrap();
        assert!(normalize(&mut q, &catalog()).is_err());
    }

    #[test]
    fn star_expands_in_column_order() {
        let mut q = parse("select * from t1").unwrap();
        normalize(&mut q, &catalog()).unwrap();
        assert_eq!(q.selectors.len(), 2);
        assert_eq!(
            q.selectors[0].expr,
            Expr::ColumnRef {
                table: "t1".into(),
                column: "id".into()
            }
        );
    }

    #[test]
    fn namespaced_identifier_matches_suffix_or_full() {
        let mut q = parse("select x from short").unwrap();
        normalize(&mut q, &catalog()).unwrap();
        assert_eq!(q.from, From::Table("ns/short".into()));

        let mut q2 = parse("select x from \"ns/short\"").unwrap();
        normalize(&mut q2, &catalog()).unwrap();
        assert_eq!(q2.from, From::Table("ns/short".into()));
    }

    #[test]
    fn subquery_normalizes_independently_and_exposes_its_output_columns() {
        let mut cat = catalog();
        cat.insert(
            "t3".into(),
            Box::new(MemoryTable::new(vec!["x".into()], vec![{
                let mut r = crate::table::TableRow::default();
                r.insert("x".into(), Value::Int(1));
                r
            }])),
        );
        let mut q = parse("select * from (select x from t3)").unwrap();
        normalize(&mut q, &cat).unwrap();
        assert_eq!(q.selectors.len(), 1);
        assert_eq!(
            q.selectors[0].expr,
            Expr::ColumnRef {
                table: "".into(),
                column: "x".into()
            }
        );
    }

    #[test]
    fn named_reference_into_subquery_column_resolves() {
        let mut cat = catalog();
        cat.insert(
            "t3".into(),
            Box::new(MemoryTable::new(vec!["x".into()], vec![{
                let mut r = crate::table::TableRow::default();
                r.insert("x".into(), Value::Int(1));
                r
            }])),
        );
        let mut q = parse("select x from (select x from t3) where x = 1").unwrap();
        normalize(&mut q, &cat).unwrap();
        assert_eq!(q.selectors.len(), 1);
        assert_eq!(
            q.selectors[0].expr,
            Expr::ColumnRef {
                table: "".into(),
                column: "x".into()
            }
        );
    }
}
