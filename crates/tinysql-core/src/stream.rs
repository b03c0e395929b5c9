//! Stream primitives (spec §4.6): lazy, single-pass row producers. The
//! spec's `{item, done, error}` shape collapses onto `Iterator<Item =
//! Result<T, Error>>` directly — `None` is done, `Some(Err(_))` is error,
//! `Some(Ok(_))` is the next item — so `filter`/`limit`/`map`/`consume` are
//! just the standard adapters plus a little error-aware glue. `rewindable`
//! is the one stateful adapter and is implemented explicitly below.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Error;
use crate::row::Row;

pub type RowResult = Result<Row, Error>;
pub type RowStream<'a> = Box<dyn Iterator<Item = RowResult> + 'a>;

/// Filters a row stream by a fallible predicate, short-circuiting on the
/// first error (spec §4.6: "propagates errors").
pub fn filter_rows<'a>(
    src: impl Iterator<Item = RowResult> + 'a,
    mut pred: impl FnMut(&Row) -> Result<bool, Error> + 'a,
) -> RowStream<'a> {
    Box::new(src.filter_map(move |item| match item {
        Err(e) => Some(Err(e)),
        Ok(row) => match pred(&row) {
            Ok(true) => Some(Ok(row)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        },
    }))
}

/// Transforms each row, short-circuiting on the first error.
pub fn map_rows<'a, T: 'a>(
    src: impl Iterator<Item = RowResult> + 'a,
    mut f: impl FnMut(Row) -> Result<T, Error> + 'a,
) -> Box<dyn Iterator<Item = Result<T, Error>> + 'a> {
    Box::new(src.map(move |item| item.and_then(&mut f)))
}

/// Materializes a stream, stopping at the first error (spec §4.6).
pub fn consume<T>(src: impl Iterator<Item = Result<T, Error>>) -> Result<Vec<T>, Error> {
    src.collect()
}

/// Shared state behind a [`Rewindable`] source: the underlying iterator
/// (dropped once exhausted) plus everything it has produced so far.
struct Shared<I> {
    source: Option<I>,
    cache: Vec<Row>,
}

/// A row source that can be replayed from the start any number of times.
/// Only the very first [`Rewindable::rewind`] playback actually pulls from
/// the wrapped iterator; every row it sees is cached, so later playbacks —
/// including one started before the first has finished — replay purely
/// from that cache once they catch up to where the source was last pulled.
/// This is the mechanism nested-loop joins use to re-scan the right-hand
/// side of the join once per left row (spec §4.6, §4.7).
pub struct Rewindable<I> {
    shared: Rc<RefCell<Shared<I>>>,
}

impl<I: Iterator<Item = RowResult>> Rewindable<I> {
    pub fn new(source: I) -> Self {
        Rewindable {
            shared: Rc::new(RefCell::new(Shared {
                source: Some(source),
                cache: Vec::new(),
            })),
        }
    }

    /// Returns a fresh playback starting at the first row.
    pub fn rewind(&self) -> Playback<I> {
        Playback {
            shared: Rc::clone(&self.shared),
            pos: 0,
        }
    }
}

/// One traversal of a [`Rewindable`] source, from the start.
pub struct Playback<I> {
    shared: Rc<RefCell<Shared<I>>>,
    pos: usize,
}

impl<I: Iterator<Item = RowResult>> Iterator for Playback<I> {
    type Item = RowResult;

    fn next(&mut self) -> Option<Self::Item> {
        let mut shared = self.shared.borrow_mut();
        if self.pos < shared.cache.len() {
            let row = shared.cache[self.pos].clone();
            self.pos += 1;
            return Some(Ok(row));
        }
        let source = shared.source.as_mut()?;
        match source.next() {
            None => {
                shared.source = None;
                None
            }
            Some(Err(e)) => Some(Err(e)),
            Some(Ok(row)) => {
                shared.cache.push(row.clone());
                self.pos += 1;
                Some(Ok(row))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Cell;
    use crate::value::Value;

    fn row(n: i64) -> Row {
        Row::new(vec![Cell::new("", "n", Value::Int(n))])
    }

    #[test]
    fn rewind_replays_same_sequence() {
        let src = vec![Ok(row(1)), Ok(row(2)), Ok(row(3))].into_iter();
        let rew = Rewindable::new(src);

        let first: Vec<Row> = rew.rewind().map(|r| r.unwrap()).collect();
        let second: Vec<Row> = rew.rewind().map(|r| r.unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn drives_source_at_most_once_to_exhaustion() {
        use std::cell::Cell as StdCell;
        let pulls = Rc::new(StdCell::new(0));
        let pulls2 = Rc::clone(&pulls);
        let mut remaining = vec![row(1), row(2)];
        let src = std::iter::from_fn(move || {
            pulls2.set(pulls2.get() + 1);
            remaining.pop().map(Ok)
        });
        let rew = Rewindable::new(src);
        let _: Vec<_> = rew.rewind().collect();
        let _: Vec<_> = rew.rewind().collect();
        let _: Vec<_> = rew.rewind().collect();
        // 2 items + 1 terminal None pull, never repeated across replays.
        assert_eq!(pulls.get(), 3);
    }

    #[test]
    fn filter_rows_propagates_error() {
        let src = vec![Ok(row(1)), Err(crate::error::ParseError::ExpectedChar { ch: 'x' }.into())].into_iter();
        let out: Vec<_> = filter_rows(src, |_| Ok(true)).collect();
        assert!(out[1].is_err());
    }
}
