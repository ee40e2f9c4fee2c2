//! Persistent multimap: every key maps to a set of values.
//!
//! Updates produce a new version that shares all unaffected structure with the old one,
//! so holding on to an old version costs nothing and never observes later updates.

use im::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};
use std::hash::Hash;

/// Immutable mapping from keys to sets of values.
///
/// Cloning is O(1). [`put`](PMultimap::put) leaves the receiver untouched,
/// [`insert`](PMultimap::insert) is the in-place form for owners that only keep the latest version.
pub struct PMultimap<K, V> {
    entries: HashMap<K, HashSet<V>>,
    len: usize,
}

impl<K: Clone, V: Clone> Clone for PMultimap<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            len: self.len,
        }
    }
}

impl<K, V> Default for PMultimap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::default(),
            len: 0,
        }
    }
}

impl<K, V> PMultimap<K, V>
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// The values for `key`; the empty set when `key` was never mapped.
    pub fn get(&self, key: &K) -> HashSet<V> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    /// Returns a new multimap in which `value` is also mapped to by `key`.
    pub fn put(&self, key: K, value: V) -> Self {
        let mut next = self.clone();
        next.insert(key, value);
        next
    }

    /// Adds `value` to the set of `key`. Returns false if it was already there.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let values = self.entries.entry(key).or_insert_with(HashSet::default);
        let added = values.insert(value).is_none();
        if added {
            self.len += 1;
        }
        added
    }

    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.entries
            .get(key)
            .map_or(false, |values| values.contains(value))
    }

    /// Keys with at least one value.
    pub fn key_set(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.keys()
    }

    /// All `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key, value)))
    }

    /// Number of `(key, value)` pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<K, V> FromIterator<(K, V)> for PMultimap<K, V>
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K, V> PartialEq for PMultimap<K, V>
where
    K: Hash + Eq,
    V: Hash + Eq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.entries == other.entries
    }
}

impl<K: Hash + Eq, V: Hash + Eq> Eq for PMultimap<K, V> {}

impl<K, V> Debug for PMultimap<K, V>
where
    K: Hash + Eq + Debug,
    V: Hash + Eq + Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_leaves_receiver_unchanged() {
        let before: PMultimap<&str, u32> = PMultimap::new().put("a", 1);
        let after = before.put("a", 2).put("b", 3);

        assert_eq!(1, before.len());
        assert!(before.contains(&"a", &1));
        assert!(!before.contains(&"a", &2));
        assert!(before.get(&"b").is_empty());

        assert_eq!(3, after.len());
        assert_eq!(2, after.get(&"a").len());
    }

    #[test]
    fn absent_key_is_empty_set() {
        let map: PMultimap<u32, u32> = PMultimap::new();
        assert!(map.get(&7).is_empty());
        assert!(map.is_empty());
        assert_eq!(0, map.key_set().count());
    }

    #[test]
    fn duplicate_values_are_counted_once() {
        let mut map = PMultimap::new();
        assert!(map.insert(1, "x"));
        assert!(!map.insert(1, "x"));
        assert!(map.insert(2, "x"));

        assert_eq!(2, map.len());
        let mut keys: Vec<_> = map.key_set().copied().collect();
        keys.sort();
        assert_eq!(vec![1, 2], keys);
    }

    #[test]
    fn snapshots_are_independent() {
        let mut map: PMultimap<u8, u8> = (0..4).map(|i| (i % 2, i)).collect();
        let snapshot = map.clone();
        map.insert(0, 10);

        assert_eq!(2, snapshot.get(&0).len());
        assert_eq!(3, map.get(&0).len());
        assert_ne!(snapshot, map);
        assert_eq!(5, map.iter().count());
    }
}
