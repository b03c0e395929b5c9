//! Executor (spec §4.7): assembles `scan -> (join . on-filter)* -> where ->
//! group -> order -> limit -> project` from a normalized [`Query`]. Every
//! stage holds only its own cursor; a failure at any stage surfaces from
//! the currently outstanding `next()` call (spec §4.8).

use tinysql_helpers::IndexMap;

use crate::ast::{Expr, From, Query};
use crate::error::{Error, SemanticError};
use crate::eval::{eval, eval_condition};
use crate::row::{dedup_column_names, Cell, Group, Row};
use crate::stream::{self, filter_rows, map_rows, Rewindable, RowResult, RowStream};
use crate::table::Table;
use crate::value::{compare_for_order, Value};

/// Executes `query` (already normalized) against `catalog`, returning the
/// lazy stream of result rows.
pub fn exec<'a>(query: &'a Query, catalog: &'a IndexMap<String, Box<dyn Table>>) -> Result<RowStream<'a>, Error> {
    let scanned = scan(&query.from, catalog)?;
    let joined = query.joins.iter().try_fold(scanned, |left, join| -> Result<RowStream<'a>, Error> {
        let right = scan_table(&join.table, catalog)?;
        let nested = nested_loop(left, right);
        let condition = join.condition.clone();
        Ok(filter_rows(nested, move |row| eval_condition(&condition, row, "an ON condition")))
    })?;

    let filtered: RowStream<'a> = match &query.filter {
        None => joined,
        Some(cond) => {
            let cond = cond.clone();
            filter_rows(joined, move |row| eval_condition(&cond, row, "a WHERE condition"))
        }
    };

    let groups = group(filtered, query)?;
    let ordered = order(groups, query)?;
    let limited: Box<dyn Iterator<Item = Result<Group, Error>>> = match query.limit {
        Some(n) => Box::new(ordered.into_iter().map(Ok).take(n as usize)),
        None => Box::new(ordered.into_iter().map(Ok)),
    };

    Ok(project(limited, query))
}

/// The `FROM` scan (spec §4.7 step 1): no `FROM` yields the single synthetic
/// empty row; a table name yields its rows tagged with that table's name; a
/// subquery executes recursively.
fn scan<'a>(from: &'a From, catalog: &'a IndexMap<String, Box<dyn Table>>) -> Result<RowStream<'a>, Error> {
    match from {
        From::Absent => Ok(Box::new(std::iter::once(Ok(Row::empty())))),
        From::Table(name) => scan_table(name, catalog),
        From::Subquery(inner) => exec(inner, catalog),
    }
}

/// Scans a single named table, tagging every cell with that table's name.
fn scan_table<'a>(name: &'a str, catalog: &'a IndexMap<String, Box<dyn Table>>) -> Result<RowStream<'a>, Error> {
    let table = catalog.get(name).expect("normalizer resolved this table name");
    let table_name = name.to_string();
    Ok(Box::new(table.get_rows().map(move |row| {
        let row = row.map_err(|e| Error::source(format!("reading from {table_name}"), e))?;
        let cells = row.into_iter().map(|(col, val)| Cell::new(table_name.clone(), col, val)).collect();
        Ok(Row::new(cells))
    })))
}

/// Nested-loop join (spec §4.7 step 2): for each left row, replay all right
/// rows via a [`Rewindable`] playback, concatenating cells from both sides.
fn nested_loop<'a>(left: RowStream<'a>, right: RowStream<'a>) -> RowStream<'a> {
    let right = Rewindable::new(right);
    let mut left = left;
    let mut current_left: Option<Row> = None;
    let mut current_right = right.rewind();
    Box::new(std::iter::from_fn(move || loop {
        if current_left.is_none() {
            match left.next() {
                None => return None,
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(row)) => {
                    current_left = Some(row);
                    current_right = right.rewind();
                }
            }
        }
        match current_right.next() {
            Some(Ok(right_row)) => {
                let left_row = current_left.clone().expect("just set above");
                return Some(Ok(Row::concat(&left_row, &right_row)));
            }
            Some(Err(e)) => return Some(Err(e)),
            None => {
                current_left = None;
            }
        }
    }))
}

/// Groups the (already joined/filtered) row stream (spec §4.7 step 4).
fn group<'a>(rows: RowStream<'a>, query: &'a Query) -> Result<Vec<Group>, Error> {
    if !query.group_by.is_empty() {
        return group_by_keys(rows, &query.group_by);
    }

    let has_aggregate = query.selectors.iter().any(|s| matches!(s.expr, Expr::Aggregate { .. }));
    let has_scalar = query.selectors.iter().any(|s| !matches!(s.expr, Expr::Aggregate { .. }));
    if has_aggregate && has_scalar {
        return Err(SemanticError::MixedScalarAndAggregate.into());
    }

    if has_aggregate {
        // select count(*) [, min(x)...]: one group holding every row.
        let all = stream::consume(rows)?;
        return Ok(vec![all]);
    }
    // select <scalar expr>...: one singleton group per row, so projection
    // stays uniform (spec §4.7 step 4).
    stream::consume(map_rows(rows, |row| Ok(vec![row])))
}

fn group_by_keys<'a>(rows: RowStream<'a>, group_by: &'a [Expr]) -> Result<Vec<Group>, Error> {
    let all = stream::consume(rows)?;
    let empty_group = Group::new();
    let mut keys: Vec<Vec<Value>> = Vec::new();
    let mut groups: Vec<Group> = Vec::new();
    for row in all {
        let key = group_by
            .iter()
            .map(|e| eval(e, &row, &empty_group))
            .collect::<Result<Vec<_>, _>>()?;
        let bucket = keys.iter().position(|k| keys_equal(k, &key));
        match bucket {
            Some(i) => groups[i].push(row),
            None => {
                keys.push(key);
                groups.push(vec![row]);
            }
        }
    }
    Ok(groups)
}

fn keys_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// Stable sort of the materialized groups (spec §4.7 step 5). Each ordering
/// key is evaluated on the group's first row, with that group in scope so
/// aggregates in `ORDER BY` work. NULLs sort last regardless of direction.
fn order(mut groups: Vec<Group>, query: &Query) -> Result<Vec<Group>, Error> {
    if query.order_by.is_empty() {
        return Ok(groups);
    }
    let mut err = None;
    groups.sort_by(|a, b| {
        if err.is_some() {
            return std::cmp::Ordering::Equal;
        }
        for spec in &query.order_by {
            let ka = match eval(&spec.expr, &a[0], a) {
                Ok(v) => v,
                Err(e) => {
                    err = Some(e);
                    return std::cmp::Ordering::Equal;
                }
            };
            let kb = match eval(&spec.expr, &b[0], b) {
                Ok(v) => v,
                Err(e) => {
                    err = Some(e);
                    return std::cmp::Ordering::Equal;
                }
            };
            match compare_for_order(&ka, &kb, spec.desc) {
                Ok(std::cmp::Ordering::Equal) => continue,
                Ok(ord) => return ord,
                Err(e) => {
                    err = Some(e);
                    return std::cmp::Ordering::Equal;
                }
            }
        }
        std::cmp::Ordering::Equal
    });
    if let Some(e) = err {
        return Err(e);
    }
    Ok(groups)
}

/// Projects each group into one result row (spec §4.7 step 7): each
/// selector becomes a cell named by its alias, or else its stringified
/// form, with an empty table tag (result rows are synthesized, not sourced
/// from a table).
fn project<'a>(groups: Box<dyn Iterator<Item = Result<Group, Error>> + 'a>, query: &'a Query) -> RowStream<'a> {
    Box::new(groups.map(move |group| {
        let group = group?;
        let example = group.first().cloned().unwrap_or_else(Row::empty);
        let mut cells = Vec::with_capacity(query.selectors.len());
        for selector in &query.selectors {
            if selector.expr == Expr::Star {
                cells.extend(example.cells().iter().cloned());
                continue;
            }
            let value = eval(&selector.expr, &example, &group)?;
            cells.push(Cell::new("", selector.output_name(), value));
        }
        Ok(Row::new(cells))
    }))
}

/// Host-visible row shape (spec §6): an ordered sequence of
/// `(column-name, Value)` pairs with duplicate names suffixed `_N`.
pub fn to_host_row(row: &Row) -> Vec<(String, Value)> {
    dedup_column_names(row)
}
