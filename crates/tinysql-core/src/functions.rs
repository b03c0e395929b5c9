//! Function library (spec §4.5): `substring`, `cardinality`,
//! `array_contains`, and the `cast` conversion used by `Expr::Cast`.
//! Grounded in `original_source/functions.go`, with one correction noted in
//! spec §9: `array_contains` there falls through to `return true` even when
//! no element matched; this implementation returns `false` in that case.

use crate::error::{Error, FunctionError, TypeError};
use crate::value::{TypeId, Value};

/// Dispatches a scalar function call by name (case-insensitive). `CAST` is
/// not looked up here: the parser produces a dedicated `Expr::Cast` node
/// for it (spec §4.2), handled by [`cast`] directly from the evaluator.
pub fn call(name: &str, args: Vec<Value>) -> Result<Value, Error> {
    match name.to_ascii_lowercase().as_str() {
        "substring" => substring(args),
        "cardinality" => cardinality(args),
        "array_contains" => array_contains(args),
        other => Err(FunctionError::UnknownFunction { name: other.to_string() }.into()),
    }
}

fn cardinality(args: Vec<Value>) -> Result<Value, Error> {
    let [array] = take_args(args, "cardinality", "1")?;
    let items = array.as_array().ok_or(TypeError::UnexpectedNull { context: "cardinality's argument" })?;
    Ok(Value::Int(items.len() as i64))
}

fn array_contains(args: Vec<Value>) -> Result<Value, Error> {
    let [array, item] = take_args(args, "array_contains", "2")?;
    let items = array
        .as_array()
        .ok_or(TypeError::UnexpectedNull { context: "array_contains's first argument" })?;
    for x in items {
        if x.eq_value(&item)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn substring(args: Vec<Value>) -> Result<Value, Error> {
    if args.len() != 2 && args.len() != 3 {
        return Err(FunctionError::Arity {
            name: "substring",
            expected: "2 or 3",
            got: args.len(),
        }
        .into());
    }
    let mut args = args.into_iter();
    let s = args.next().unwrap();
    let text: Vec<char> = s
        .as_str()
        .ok_or(TypeError::UnexpectedNull { context: "substring's first argument" })?
        .chars()
        .collect();
    let len = text.len() as i64;

    let start_arg = args.next().unwrap().as_int().ok_or(TypeError::UnexpectedNull { context: "substring's start argument" })?;
    let start = norm_index(start_arg, len)?;

    match args.next() {
        None => {
            let start = start.clamp(0, len) as usize;
            Ok(Value::String(text[start..].iter().collect()))
        }
        Some(end_value) => {
            let end_arg = end_value.as_int().ok_or(TypeError::UnexpectedNull { context: "substring's end argument" })?;
            let end = norm_index(end_arg, len)?;
            let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
            let lo = lo.clamp(0, len) as usize;
            let hi = (hi + 1).clamp(0, len) as usize;
            Ok(Value::String(text[lo..hi.max(lo)].iter().collect()))
        }
    }
}

/// 1-based index normalization (spec §4.5): positive indexes from the
/// start, negative from the end, zero is an error.
fn norm_index(x: i64, len: i64) -> Result<i64, Error> {
    match x.cmp(&0) {
        std::cmp::Ordering::Greater => Ok(x - 1),
        std::cmp::Ordering::Less => Ok(x + len),
        std::cmp::Ordering::Equal => Err(FunctionError::ZeroIndex { name: "substring" }.into()),
    }
}

/// `CAST(expr AS type)` (spec §4.5): identity when the value is already
/// `type`, `String -> Int` via decimal parse, everything else an error.
pub fn cast(value: Value, type_name: &str) -> Result<Value, Error> {
    let target = TypeId::parse_name(type_name).ok_or(TypeError::UnsupportedCast {
        from: value.type_id(),
        to: TypeId::Undefined,
    })?;
    if value.type_id() == target {
        return Ok(value);
    }
    match (&value, target) {
        (Value::String(s), TypeId::Int) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| TypeError::UnsupportedCast { from: TypeId::String, to: TypeId::Int }.into()),
        _ => Err(TypeError::UnsupportedCast { from: value.type_id(), to: target }.into()),
    }
}

fn take_args<const N: usize>(args: Vec<Value>, name: &'static str, expected: &'static str) -> Result<[Value; N], Error> {
    args.try_into()
        .map_err(|got: Vec<Value>| FunctionError::Arity { name, expected, got: got.len() }.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_two_args_positive_start() {
        let v = substring(vec![Value::String("hello".into()), Value::Int(2)]).unwrap();
        assert_eq!(v, Value::String("ello".into()));
    }

    #[test]
    fn substring_negative_start_and_end() {
        let v = substring(vec![Value::String("back yard".into()), Value::Int(-1), Value::Int(-4)]).unwrap();
        assert_eq!(v, Value::String("yard".into()));
    }

    #[test]
    fn substring_zero_start_errors() {
        assert!(substring(vec![Value::String("x".into()), Value::Int(0)]).is_err());
    }

    #[test]
    fn cardinality_counts_elements() {
        let v = cardinality(vec![Value::Array(vec![Value::Int(1), Value::Int(2)])]).unwrap();
        assert_eq!(v, Value::Int(2));
    }

    #[test]
    fn array_contains_false_when_absent() {
        let v = array_contains(vec![Value::Array(vec![Value::Int(1), Value::Int(2)]), Value::Int(3)]).unwrap();
        assert_eq!(v, Value::Bool(false));
    }

    #[test]
    fn array_contains_true_when_present() {
        let v = array_contains(vec![Value::Array(vec![Value::Int(1), Value::Int(2)]), Value::Int(2)]).unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn cast_string_to_int() {
        let v = cast(Value::String("42".into()), "INT").unwrap();
        assert_eq!(v, Value::Int(42));
    }

    #[test]
    fn cast_identity_when_types_match() {
        let v = cast(Value::Int(1), "INT").unwrap();
        assert_eq!(v, Value::Int(1));
    }

    #[test]
    fn cast_bad_decimal_errors() {
        assert!(cast(Value::String("nope".into()), "INT").is_err());
    }
}
