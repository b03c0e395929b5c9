//! `tinysql-core`: parser, evaluator, and execution pipeline for a small
//! embeddable SQL subset (see the crate's `SPEC_FULL.md` for the full
//! engine design). The only thing a host needs to implement is
//! [`table::Table`]; everything else is exposed through [`Engine`].

pub mod aggregate;
pub mod ast;
pub mod error;
pub mod eval;
pub mod exec;
pub mod functions;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod row;
pub mod stream;
pub mod table;
pub mod token;
pub mod value;

use tinysql_helpers::IndexMap;

pub use ast::Query;
pub use error::Error;
pub use row::Row;
pub use table::Table;
pub use value::Value;

/// The engine, parameterized by the table catalog supplied at construction
/// (spec §6: "new(catalog: mapping name->Table) -> Engine").
pub struct Engine {
    catalog: IndexMap<String, Box<dyn Table>>,
}

impl Engine {
    pub fn new(catalog: IndexMap<String, Box<dyn Table>>) -> Self {
        log::trace!("engine constructed with {} table(s)", catalog.len());
        Engine { catalog }
    }

    /// Parses a SQL string into a [`Query`] AST (spec §6). Does not
    /// normalize or touch the catalog, so the AST can be inspected (or
    /// `Display`-formatted, or parsed more than once for idempotence
    /// checks) before it's resolved against this engine's tables.
    pub fn parse(&self, sql: &str) -> Result<Query, Error> {
        parser::parse(sql)
    }

    /// Normalizes `query` against the catalog and returns its row stream
    /// (spec §6). `query` is borrowed for the lifetime of the returned
    /// stream — callers keep the parsed AST alive for as long as they read
    /// from the stream, which is ordinary borrowing rather than a copy of
    /// the whole plan per call.
    pub fn exec<'q>(&'q self, query: &'q mut Query) -> Result<Box<dyn Iterator<Item = Result<Row, Error>> + 'q>, Error> {
        normalize::normalize(query, &self.catalog)?;
        log::debug!("executing normalized query");
        exec::exec(&*query, &self.catalog)
    }

    /// Convenience: parse + exec + consume (spec §6).
    pub fn exec_string(&self, sql: &str) -> Result<Vec<Vec<(String, Value)>>, Error> {
        let mut query = self.parse(sql)?;
        let stream = self.exec(&mut query)?;
        let rows = stream::consume(stream)?;
        Ok(rows.iter().map(exec::to_host_row).collect())
    }
}
