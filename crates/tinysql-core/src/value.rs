//! The typed value system (spec §3, §4.4): a tagged union over
//! `{Null, String, Int, Double, Bool, Array, Json}`. NULL is represented as
//! its own variant rather than as a `(type, null)` pair — more awkward data
//! models in the original (Go `any` payloads) collapse into this cleanly in
//! a sum type.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, TypeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeId {
    Undefined,
    String,
    Int,
    Double,
    Bool,
    Array,
    Json,
}

impl TypeId {
    /// Parses a `CAST(... AS type)` type keyword (case-insensitive) into a
    /// `TypeId`, or `None` for an unrecognized name.
    pub fn parse_name(name: &str) -> Option<TypeId> {
        match name.to_ascii_uppercase().as_str() {
            "INT" => Some(TypeId::Int),
            "STRING" => Some(TypeId::String),
            "DOUBLE" => Some(TypeId::Double),
            "BOOL" => Some(TypeId::Bool),
            "ARRAY" => Some(TypeId::Array),
            "JSON" => Some(TypeId::Json),
            _ => None,
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeId::Undefined => "Undefined",
            TypeId::String => "String",
            TypeId::Int => "Int",
            TypeId::Double => "Double",
            TypeId::Bool => "Bool",
            TypeId::Array => "Array",
            TypeId::Json => "JSON",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL. Corresponds to spec's `(TypeID, Data=null)` regardless of
    /// which TypeID the source declared.
    Null,
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Array(Vec<Value>),
    /// An opaque JSON blob that didn't fit the scalar types above (e.g. a
    /// nested object/array in a host row). Carried through but not
    /// computable on beyond equality of its serialized form.
    Json(String),
}

impl Value {
    pub fn type_id(&self) -> TypeId {
        match self {
            Value::Null => TypeId::Undefined,
            Value::String(_) => TypeId::String,
            Value::Int(_) => TypeId::Int,
            Value::Double(_) => TypeId::Double,
            Value::Bool(_) => TypeId::Bool,
            Value::Array(_) => TypeId::Array,
            Value::Json(_) => TypeId::Json,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// `=`: equal TypeID required; equality is value equality for
    /// String/Int/Bool/Double/Array. Errors on NULL operands (spec §4.4:
    /// arithmetic comparisons involving NULL are an error outside ordering).
    pub fn eq_value(&self, other: &Value) -> Result<bool, Error> {
        self.require_non_null("compared")?;
        other.require_non_null("compared")?;
        self.require_same_type(other)?;
        match (self, other) {
            (Value::String(a), Value::String(b)) => Ok(a == b),
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Double(a), Value::Double(b)) => Ok(a == b),
            (Value::Array(a), Value::Array(b)) => Ok(a == b),
            (Value::Json(a), Value::Json(b)) => Ok(a == b),
            _ => Err(TypeError::Uncomparable { ty: self.type_id() }.into()),
        }
    }

    /// `<`: defined on Int and Double only.
    pub fn less_than(&self, other: &Value) -> Result<bool, Error> {
        self.require_non_null("compared")?;
        other.require_non_null("compared")?;
        self.require_same_type(other)?;
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a < b),
            (Value::Double(a), Value::Double(b)) => Ok(a < b),
            _ => Err(TypeError::Uncomparable { ty: self.type_id() }.into()),
        }
    }

    /// `>` is computed as "not equal and not less", per spec §4.4.
    pub fn greater_than(&self, other: &Value) -> Result<bool, Error> {
        let eq = self.eq_value(other)?;
        if eq {
            return Ok(false);
        }
        let lt = self.less_than(other)?;
        Ok(!lt)
    }

    fn require_non_null(&self, context: &'static str) -> Result<(), Error> {
        if self.is_null() {
            return Err(TypeError::UnexpectedNull { context }.into());
        }
        Ok(())
    }

    fn require_same_type(&self, other: &Value) -> Result<(), Error> {
        if self.type_id() != other.type_id() {
            return Err(TypeError::MismatchedTypes {
                left: self.type_id(),
                right: other.type_id(),
            }
            .into());
        }
        Ok(())
    }
}

/// Ordering comparison used by `ORDER BY`: NULL sorts last regardless of
/// direction (spec §4.7, §8). `desc` has already been applied by the caller
/// swapping operands for non-null/non-null comparisons; here we only special
/// case NULL so its placement is direction-independent.
pub fn compare_for_order(a: &Value, b: &Value, desc: bool) -> Result<Ordering, Error> {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ok(Ordering::Equal),
        (true, false) => return Ok(Ordering::Greater),
        (false, true) => return Ok(Ordering::Less),
        (false, false) => {}
    }
    if a.eq_value(b)? {
        return Ok(Ordering::Equal);
    }
    let a_lt_b = a.less_than(b)?;
    let ordering = if a_lt_b { Ordering::Less } else { Ordering::Greater };
    Ok(if desc { ordering.reverse() } else { ordering })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::String(s) => write!(f, "{s}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Array(xs) => {
                write!(f, "[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, "]")
            }
            Value::Json(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_requires_same_type() {
        let err = Value::Int(1).eq_value(&Value::String("a".into()));
        assert!(err.is_err());
    }

    #[test]
    fn greater_than_is_not_eq_and_not_less() {
        assert!(Value::Int(3).greater_than(&Value::Int(2)).unwrap());
        assert!(!Value::Int(2).greater_than(&Value::Int(2)).unwrap());
        assert!(!Value::Int(1).greater_than(&Value::Int(2)).unwrap());
    }

    #[test]
    fn null_sorts_last_both_directions() {
        use std::cmp::Ordering;
        assert_eq!(
            compare_for_order(&Value::Null, &Value::Int(1), false).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            compare_for_order(&Value::Null, &Value::Int(1), true).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            compare_for_order(&Value::Int(1), &Value::Null, true).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn comparison_with_null_operand_errors_outside_ordering() {
        assert!(Value::Null.eq_value(&Value::Int(1)).is_err());
        assert!(Value::Int(1).less_than(&Value::Null).is_err());
    }
}
