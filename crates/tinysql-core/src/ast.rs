//! The query AST (spec §3, §4.2): a discriminated node set built by the
//! parser, mutated in place by the normalizer, then read-only during
//! execution.

use std::fmt;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    Lt,
    Gt,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Eq => "=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Value(Value),
    /// `table` is empty for a bare (unqualified) column reference, resolved
    /// by the normalizer before execution.
    ColumnRef { table: String, column: String },
    Star,
    Aggregate { name: String, args: Vec<Expr> },
    Function { name: String, args: Vec<Expr> },
    BinaryOp { op: BinOp, left: Box<Expr>, right: Box<Expr> },
    Or { left: Box<Expr>, right: Box<Expr> },
    Cast { expr: Box<Expr>, type_name: String },
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expr, right: Expr) -> Expr {
        Expr::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn bare_column(name: impl Into<String>) -> Expr {
        Expr::ColumnRef {
            table: String::new(),
            column: name.into(),
        }
    }

    /// The name this expression projects to when a selector has no explicit
    /// alias: a column reference's own (unqualified) column name, or
    /// everything else's `Display` form (`count(*)`, `CAST(...)`, etc. are
    /// already bare enough to use as-is).
    pub fn default_name(&self) -> String {
        match self {
            Expr::ColumnRef { column, .. } => column.clone(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Value(v) => write_literal(f, v),
            Expr::ColumnRef { table, column } => {
                if table.is_empty() {
                    write!(f, "\"{column}\"")
                } else {
                    write!(f, "\"{table}\".\"{column}\"")
                }
            }
            Expr::Star => write!(f, "*"),
            Expr::Aggregate { name, args } => write_call(f, name, args),
            Expr::Function { name, args } => write_call(f, name, args),
            Expr::BinaryOp { op, left, right } => write!(f, "{left} {op} {right}"),
            Expr::Or { left, right } => write!(f, "{left} OR {right}"),
            Expr::Cast { expr, type_name } => write!(f, "CAST({expr} AS {type_name})"),
        }
    }
}

/// Formats a literal value the way the parser's grammar expects to read it
/// back, so `Display`-ing an `Expr` and re-parsing it round-trips (spec §8's
/// parse/format/parse idempotence invariant). This intentionally diverges
/// from `Value`'s own `Display` impl, which instead renders a value for
/// host-facing output (unquoted strings, no `ARRAY[...]` wrapper).
fn write_literal(f: &mut fmt::Formatter<'_>, v: &Value) -> fmt::Result {
    match v {
        Value::Null => write!(f, "NULL"),
        Value::String(s) => {
            write!(f, "'")?;
            for c in s.chars() {
                if c == '\'' || c == '\\' {
                    write!(f, "\\")?;
                }
                write!(f, "{c}")?;
            }
            write!(f, "'")
        }
        Value::Int(n) => write!(f, "{n}"),
        Value::Double(d) => write!(f, "{d}"),
        Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        Value::Array(items) => {
            write!(f, "ARRAY[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_literal(f, item)?;
            }
            write!(f, "]")
        }
        Value::Json(s) => write!(f, "{s}"),
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, args: &[Expr]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{a}")?;
    }
    write!(f, ")")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl Selector {
    /// The column name a selector projects to when it has no explicit
    /// alias: the expression's stringified form (spec §4.7 step 7), or for
    /// a column reference, its own bare column name rather than the
    /// quoted/qualified `Display` form — so a table or subquery referenced
    /// by its bare column name downstream (e.g. star expansion followed by
    /// a named reference into a subquery, spec §4.3) can actually find it.
    pub fn output_name(&self) -> String {
        self.alias.clone().unwrap_or_else(|| self.expr.default_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub condition: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub expr: Expr,
    pub desc: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum From {
    #[default]
    Absent,
    Table(String),
    Subquery(Box<Query>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub from: From,
    pub joins: Vec<Join>,
    pub filter: Option<Expr>,
    pub selectors: Vec<Selector>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<OrderSpec>,
    pub limit: Option<u64>,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "SELECT")?;
        for (i, s) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}", s.expr)?;
            if let Some(alias) = &s.alias {
                write!(f, " AS {alias}")?;
            }
        }
        match &self.from {
            From::Absent => {}
            From::Table(name) => write!(f, "\n{:>8} \"{name}\"", "FROM")?,
            From::Subquery(q) => write!(f, "\n{:>8} ({q})", "FROM")?,
        }
        for j in &self.joins {
            write!(f, "\n{:>8} \"{}\" ON {}", "JOIN", j.table, j.condition)?;
        }
        if let Some(filter) = &self.filter {
            write!(f, "\n{:>8} {filter}", "WHERE")?;
        }
        if !self.group_by.is_empty() {
            write!(f, "\n{:>8} ", "GROUP BY")?;
            for (i, g) in self.group_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{g}")?;
            }
        }
        if !self.order_by.is_empty() {
            write!(f, "\n{:>8}", "ORDER BY")?;
            for (i, o) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, " {}", o.expr)?;
                if o.desc {
                    write!(f, " DESC")?;
                }
            }
        }
        if let Some(limit) = self.limit {
            write!(f, "\n{:>8} {limit}", "LIMIT")?;
        }
        Ok(())
    }
}
