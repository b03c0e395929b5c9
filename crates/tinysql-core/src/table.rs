//! The external `Table` collaborator (spec §6): the only interface the core
//! needs from a host. Hosts supply JSON loaders, database adapters, etc.;
//! the core only ever calls these two methods.

use tinysql_helpers::IndexMap;

use crate::value::Value;

/// One row as the host hands it to us: an (ordered) mapping from column name
/// to value. Order only matters for `*` expansion fallback when a table
/// doesn't declare `column_names` consistently with row contents; the
/// normalizer is the source of truth for declared order.
pub type TableRow = IndexMap<String, Value>;

/// Boxed error from a host row producer, wrapped with context by the
/// executor (spec §7: "Source error").
pub type TableError = Box<dyn std::error::Error + Send + Sync>;

/// A fresh, independent row iterator. Each call to [`Table::get_rows`] must
/// return one of these; the engine may only call `get_rows` more than once
/// per query through the [`crate::stream::rewindable`] adapter on a join's
/// right-hand side.
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<TableRow, TableError>> + 'a>;

/// External collaborator supplying rows for one named table.
pub trait Table {
    /// Declared column names, in catalog order. Used for `*` expansion.
    fn column_names(&self) -> Vec<String>;

    /// Produces a fresh row iterator. Tables are assumed immutable for the
    /// life of a query, so every call must enumerate the same rows.
    fn get_rows(&self) -> RowIter<'_>;
}

/// A simple in-memory table backed by a fixed set of rows, useful for tests
/// and small embedded catalogs.
pub struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl MemoryTable {
    pub fn new(columns: Vec<String>, rows: Vec<TableRow>) -> Self {
        MemoryTable { columns, rows }
    }
}

impl Table for MemoryTable {
    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn get_rows(&self) -> RowIter<'_> {
        Box::new(self.rows.clone().into_iter().map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_table_yields_independent_iterators() {
        let mut row = TableRow::default();
        row.insert("id".into(), Value::Int(1));
        let t = MemoryTable::new(vec!["id".into()], vec![row]);
        assert_eq!(t.get_rows().count(), 1);
        assert_eq!(t.get_rows().count(), 1);
    }
}
