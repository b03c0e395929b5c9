//! Expression evaluator (spec §4.4): `eval(expr, row, group) -> Value`. A
//! pure function over an already-normalized expression tree; by the time
//! execution reaches here every `ColumnRef` is fully resolved and every
//! `Star` has been expanded away except the one a caller must special-case
//! (projection).

use crate::aggregate;
use crate::ast::{BinOp, Expr};
use crate::error::{Error, SemanticError};
use crate::functions;
use crate::row::{Group, Row};
use crate::value::Value;

/// Evaluates `expr` against `row`, with `group` available for `Aggregate`
/// nodes. `row` is ignored by aggregates, which look only at `group`.
pub fn eval(expr: &Expr, row: &Row, group: &Group) -> Result<Value, Error> {
    match expr {
        Expr::Value(v) => Ok(v.clone()),
        Expr::ColumnRef { table, column } => row.get(table, column).cloned().ok_or_else(|| {
            SemanticError::ColumnNotInRow {
                table: table.clone(),
                column: column.clone(),
            }
            .into()
        }),
        Expr::Star => Err(SemanticError::StarOutsideProjection.into()),
        Expr::BinaryOp { op, left, right } => {
            let l = eval(left, row, group)?;
            let r = eval(right, row, group)?;
            let result = match op {
                BinOp::Eq => l.eq_value(&r)?,
                BinOp::Lt => l.less_than(&r)?,
                BinOp::Gt => l.greater_than(&r)?,
            };
            Ok(Value::Bool(result))
        }
        Expr::Or { left, right } => {
            let l = eval(left, row, group)?;
            let lb = expect_bool(&l, "the left-hand side of OR")?;
            if lb {
                return Ok(l);
            }
            let r = eval(right, row, group)?;
            expect_bool(&r, "the right-hand side of OR")?;
            Ok(r)
        }
        Expr::Cast { expr, type_name } => {
            let v = eval(expr, row, group)?;
            functions::cast(v, type_name)
        }
        Expr::Function { name, args } => {
            let values = args
                .iter()
                .map(|a| eval(a, row, group))
                .collect::<Result<Vec<_>, _>>()?;
            functions::call(name, values)
        }
        Expr::Aggregate { name, args } => aggregate::eval(name, args, group),
    }
}

/// Evaluates `expr` as a `WHERE`/`ON` condition, requiring a `Bool` result
/// (spec §4.7 steps 2-3; §7: "Bool expected in WHERE/ON").
pub fn eval_condition(expr: &Expr, row: &Row, context: &'static str) -> Result<bool, Error> {
    let v = eval(expr, row, &Group::new())?;
    expect_bool(&v, context)
}

fn expect_bool(v: &Value, context: &'static str) -> Result<bool, Error> {
    v.as_bool().ok_or_else(|| {
        SemanticError::ExpectedBool {
            context,
            got: v.type_id(),
        }
        .into()
    })
}
