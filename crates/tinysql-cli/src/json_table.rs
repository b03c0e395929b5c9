//! Two `Table` implementations backed by JSON, grounded in
//! `original_source/json-table.go`'s `JsonTable` (eager, type-widening) and
//! `jsonStream` (lazy, schema from the first record only).
//!
//! `original_source/json-table.go`'s `castToInt` exists to undo the fact
//! that Go's `encoding/json` always decodes numbers as `float64`; `serde_json`
//! already distinguishes integer literals (`Number::is_i64`) from ones with a
//! fractional part, so that step has no counterpart here.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as Json};
use tinysql_helpers::IndexMap;
use tinysql_core::table::{RowIter, Table, TableRow};
use tinysql_core::value::{TypeId, Value};

#[derive(Debug, thiserror::Error)]
pub enum JsonTableError {
    #[error("reading {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("parsing JSON in {path}: {source}")]
    Parse { path: PathBuf, #[source] source: serde_json::Error },
    #[error("column {column} mixes incompatible types {a} and {b}")]
    TypeConflict { column: String, a: TypeId, b: TypeId },
    #[error("unsupported JSON value for column {column}: {value}")]
    UnsupportedValue { column: String, value: Json },
}

fn guess_type(v: &Json) -> TypeId {
    match v {
        Json::Null => TypeId::Undefined,
        Json::Bool(_) => TypeId::Bool,
        Json::Number(n) => {
            if n.is_i64() || n.is_u64() {
                TypeId::Int
            } else {
                TypeId::Double
            }
        }
        Json::String(_) => TypeId::String,
        Json::Array(_) => TypeId::Array,
        Json::Object(_) => TypeId::Json,
    }
}

/// Widens two observed column types into one, the way
/// `original_source/json-table.go`'s `extend` closure does: `Int`/`String`
/// conflicts widen to `String`; anything else conflicting is an error.
fn widen(column: &str, a: TypeId, b: TypeId) -> Result<TypeId, JsonTableError> {
    if a == TypeId::Undefined {
        return Ok(b);
    }
    if a == b {
        return Ok(a);
    }
    if matches!((a, b), (TypeId::Int, TypeId::String) | (TypeId::String, TypeId::Int)) {
        return Ok(TypeId::String);
    }
    Err(JsonTableError::TypeConflict { column: column.to_string(), a, b })
}

fn convert(column: &str, v: &Json, ty: TypeId) -> Result<Value, JsonTableError> {
    if v.is_null() {
        return Ok(Value::Null);
    }
    match ty {
        TypeId::Undefined => Ok(Value::Null),
        TypeId::Int => v
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| JsonTableError::UnsupportedValue { column: column.to_string(), value: v.clone() }),
        TypeId::Double => v
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| JsonTableError::UnsupportedValue { column: column.to_string(), value: v.clone() }),
        TypeId::Bool => v
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| JsonTableError::UnsupportedValue { column: column.to_string(), value: v.clone() }),
        // Widened from Int (or a column that is plain String already): stringify
        // the raw JSON scalar rather than requiring it to already be a string.
        TypeId::String => match v {
            Json::String(s) => Ok(Value::String(s.clone())),
            other => Ok(Value::String(other.to_string())),
        },
        TypeId::Array => {
            let items = v
                .as_array()
                .ok_or_else(|| JsonTableError::UnsupportedValue { column: column.to_string(), value: v.clone() })?;
            let values = items
                .iter()
                .map(|item| convert(column, item, guess_type(item)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        }
        TypeId::Json => Ok(Value::Json(v.to_string())),
    }
}

/// Eager JSON-array table loader: reads the whole file, widens each
/// column's type across every row, then holds fully-converted rows in
/// memory (`original_source/json-table.go`'s `JsonTable`).
pub struct JsonFileTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl JsonFileTable {
    pub fn load(path: &Path) -> Result<Self, JsonTableError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| JsonTableError::Io { path: path.to_path_buf(), source })?;
        let items: Vec<Map<String, Json>> = serde_json::from_str(&text)
            .map_err(|source| JsonTableError::Parse { path: path.to_path_buf(), source })?;

        let mut schema: IndexMap<String, TypeId> = IndexMap::default();
        for item in &items {
            for (k, v) in item {
                let observed = guess_type(v);
                let current = schema.get(k).copied().unwrap_or(TypeId::Undefined);
                schema.insert(k.clone(), widen(k, current, observed)?);
            }
        }

        let columns: Vec<String> = schema.keys().cloned().collect();
        let mut rows = Vec::with_capacity(items.len());
        for item in &items {
            let mut row = TableRow::default();
            for (col, ty) in &schema {
                let value = match item.get(col) {
                    Some(v) => convert(col, v, *ty)?,
                    None => Value::Null,
                };
                row.insert(col.clone(), value);
            }
            rows.push(row);
        }

        Ok(JsonFileTable { columns, rows })
    }
}

impl Table for JsonFileTable {
    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn get_rows(&self) -> RowIter<'_> {
        Box::new(self.rows.clone().into_iter().map(Ok))
    }
}

/// Lazy, single-pass JSON Lines table: schema is inferred from the first
/// record only (no widening), and every [`Table::get_rows`] call reopens the
/// file and streams it with a fresh `serde_json::Deserializer`
/// (`original_source/json-table.go`'s `jsonStream`).
pub struct JsonLinesTable {
    path: PathBuf,
    schema: IndexMap<String, TypeId>,
}

impl JsonLinesTable {
    pub fn open(path: &Path) -> Result<Self, JsonTableError> {
        let mut schema: IndexMap<String, TypeId> = IndexMap::default();
        let file = File::open(path).map_err(|source| JsonTableError::Io { path: path.to_path_buf(), source })?;
        let mut stream = serde_json::Deserializer::from_reader(BufReader::new(file)).into_iter::<Map<String, Json>>();
        if let Some(first) = stream.next() {
            let first = first.map_err(|source| JsonTableError::Parse { path: path.to_path_buf(), source })?;
            for (k, v) in &first {
                schema.insert(k.clone(), guess_type(v));
            }
        }
        Ok(JsonLinesTable { path: path.to_path_buf(), schema })
    }
}

impl Table for JsonLinesTable {
    fn column_names(&self) -> Vec<String> {
        self.schema.keys().cloned().collect()
    }

    fn get_rows(&self) -> RowIter<'_> {
        let path = self.path.clone();
        let schema = self.schema.clone();
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(source) => {
                let err: Box<dyn std::error::Error + Send + Sync> =
                    Box::new(JsonTableError::Io { path, source });
                return Box::new(std::iter::once(Err(err)));
            }
        };
        let stream = serde_json::Deserializer::from_reader(BufReader::new(file)).into_iter::<Map<String, Json>>();
        Box::new(stream.map(move |item| {
            let item = item.map_err(|source| {
                let err: Box<dyn std::error::Error + Send + Sync> =
                    Box::new(JsonTableError::Parse { path: path.clone(), source });
                err
            })?;
            let mut row = TableRow::default();
            for (col, ty) in &schema {
                let value = match item.get(col) {
                    Some(v) => convert(col, v, *ty).map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?,
                    None => Value::Null,
                };
                row.insert(col.clone(), value);
            }
            Ok(row)
        }))
    }
}
