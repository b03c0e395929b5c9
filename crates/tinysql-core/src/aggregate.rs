//! Aggregate functions (spec §4.5): `count(*)` and `min(expr)`, dispatched
//! over a `Group` rather than a single row. Grounded in
//! `original_source/eval.go`'s `aggregate`/`functionkek` `eval` methods,
//! generalized to the tagged `Expr::Aggregate` node.

use crate::ast::Expr;
use crate::error::{Error, FunctionError};
use crate::row::Group;
use crate::value::Value;

/// Evaluates an aggregate by name over `group` (spec §4.4: "evaluated over
/// `group`, not `row`").
pub fn eval(name: &str, args: &[Expr], group: &Group) -> Result<Value, Error> {
    match name.to_ascii_lowercase().as_str() {
        "count" => count(args, group),
        "min" => min(args, group),
        other => Err(FunctionError::UnknownAggregate { name: other.to_string() }.into()),
    }
}

fn count(args: &[Expr], group: &Group) -> Result<Value, Error> {
    if args.len() != 1 || args[0] != Expr::Star {
        return Err(FunctionError::Arity {
            name: "count",
            expected: "1 (count(*))",
            got: args.len(),
        }
        .into());
    }
    Ok(Value::Int(group.len() as i64))
}

/// Smallest value by the `<` relation; an empty group yields NULL (spec
/// §4.5).
fn min(args: &[Expr], group: &Group) -> Result<Value, Error> {
    if args.len() != 1 {
        return Err(FunctionError::Arity {
            name: "min",
            expected: "1",
            got: args.len(),
        }
        .into());
    }
    let mut smallest = Value::Null;
    for (i, row) in group.iter().enumerate() {
        let v = crate::eval::eval(&args[0], row, group)?;
        if i == 0 || v.less_than(&smallest)? {
            smallest = v;
        }
    }
    Ok(smallest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{Cell, Row};

    fn group_of(values: &[i64]) -> Group {
        values
            .iter()
            .map(|v| Row::new(vec![Cell::new("t", "n", Value::Int(*v))]))
            .collect()
    }

    #[test]
    fn count_star_counts_rows() {
        let g = group_of(&[1, 2, 3]);
        let v = eval("count", &[Expr::Star], &g).unwrap();
        assert_eq!(v, Value::Int(3));
    }

    #[test]
    fn min_finds_smallest() {
        let g = group_of(&[3, 1, 2]);
        let v = eval("min", &[Expr::bare_column("n")], &g).unwrap();
        assert_eq!(v, Value::Int(1));
    }

    #[test]
    fn min_of_empty_group_is_null() {
        let v = eval("min", &[Expr::bare_column("n")], &Group::new()).unwrap();
        assert_eq!(v, Value::Null);
    }
}
