//! Order-preserving duplicate removal.

use std::collections::HashSet;
use std::hash::Hash;

/// Drop every row whose key equals the key of an earlier row.
///
/// The first occurrence wins and survivors keep their relative order, so
/// running this on its own output changes nothing.
pub fn dedup_by_key<T, K, F>(rows: Vec<T>, key: F) -> Vec<T>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter().filter(|row| seen.insert(key(row))).collect()
}

/// Number of rows that `dedup_by_key` would remove.
pub fn count_duplicates<T, K, F>(rows: &[T], key: F) -> usize
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter().filter(|row| !seen.insert(key(*row))).count()
}
