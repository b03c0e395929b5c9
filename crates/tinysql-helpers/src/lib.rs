//! Small shared utilities used across the tinysql crates.

use std::collections::hash_map::RandomState;

/// An insertion-ordered map, used for catalog and schema bookkeeping where
/// the declared order of tables/columns is observable (e.g. `*` expansion).
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, RandomState>;
