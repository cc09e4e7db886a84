//! # Ordered Map
//!
//! A key/value facade over the B-tree engine. Entries are stored as
//! key/value pairs ordered by the key's natural `Ord`; every operation
//! forwards to the engine with a probe pair whose value slot is
//! `V::default()` (ordering never consults values, so the placeholder is
//! inert). Like the engine, the map clones in O(1): `Clone` produces an
//! independent snapshot.

use crate::btree::{BTree, Iter, Options};

#[derive(Clone)]
pub(crate) struct Pair<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

/// An ordered key/value map with copy-on-write snapshots.
pub struct Map<K, V> {
    tree: BTree<Pair<K, V>>,
}

impl<K, V> Map<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Default + Send + Sync + 'static,
{
    /// An empty map with the default degree.
    pub fn new() -> Self {
        Self::with_degree(0)
    }

    /// An empty map with a specific node fanout; `0` selects the default.
    pub fn with_degree(degree: usize) -> Self {
        Map {
            tree: BTree::new_with(
                |a: &Pair<K, V>, b: &Pair<K, V>| a.key < b.key,
                Options { degree },
            ),
        }
    }

    fn probe(key: &K) -> Pair<K, V> {
        Pair {
            key: key.clone(),
            value: V::default(),
        }
    }

    /// Insert or replace the value for `key`, returning the previous one.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.tree.set(Pair { key, value }).map(|pair| pair.value)
    }

    /// Bulk-append form of [`set`](Self::set) for keys arriving in
    /// ascending order; degrades to a plain `set` when they do not.
    pub fn load(&mut self, key: K, value: V) -> Option<V> {
        self.tree.load(Pair { key, value }).map(|pair| pair.value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(&Self::probe(key)).map(|pair| &pair.value)
    }

    /// Fetch a value for editing; the touched path is isolated from other
    /// snapshots first.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree
            .get_mut(&Self::probe(key))
            .map(|pair| &mut pair.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove the entry for `key`, returning its value.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        self.tree.delete(&Self::probe(key)).map(|pair| pair.value)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// Entry with the smallest key.
    pub fn min(&self) -> Option<(&K, &V)> {
        self.tree.min().map(|pair| (&pair.key, &pair.value))
    }

    /// Entry with the largest key.
    pub fn max(&self) -> Option<(&K, &V)> {
        self.tree.max().map(|pair| (&pair.key, &pair.value))
    }

    pub fn pop_min(&mut self) -> Option<(K, V)> {
        self.tree.pop_min().map(|pair| (pair.key, pair.value))
    }

    pub fn pop_max(&mut self) -> Option<(K, V)> {
        self.tree.pop_max().map(|pair| (pair.key, pair.value))
    }

    /// Entry at rank `index` in key order.
    pub fn get_at(&self, index: usize) -> Option<(&K, &V)> {
        self.tree.get_at(index).map(|pair| (&pair.key, &pair.value))
    }

    /// Remove and return the entry at rank `index`.
    pub fn delete_at(&mut self, index: usize) -> Option<(K, V)> {
        self.tree.delete_at(index).map(|pair| (pair.key, pair.value))
    }

    /// Visit entries in key order until `f` returns `false`.
    pub fn scan(&self, mut f: impl FnMut(&K, &V) -> bool) {
        self.tree.scan(|pair| f(&pair.key, &pair.value))
    }

    /// Visit entries in reverse key order until `f` returns `false`.
    pub fn reverse(&self, mut f: impl FnMut(&K, &V) -> bool) {
        self.tree.reverse(|pair| f(&pair.key, &pair.value))
    }

    /// Visit entries with keys `>= pivot`, ascending.
    pub fn ascend(&self, pivot: &K, mut f: impl FnMut(&K, &V) -> bool) {
        self.tree
            .ascend(&Self::probe(pivot), |pair| f(&pair.key, &pair.value))
    }

    /// Visit entries with keys `<= pivot`, descending.
    pub fn descend(&self, pivot: &K, mut f: impl FnMut(&K, &V) -> bool) {
        self.tree
            .descend(&Self::probe(pivot), |pair| f(&pair.key, &pair.value))
    }

    /// All keys, in order.
    pub fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        self.scan(|key, _| {
            keys.push(key.clone());
            true
        });
        keys
    }

    /// All values, in key order.
    pub fn values(&self) -> Vec<V> {
        let mut values = Vec::with_capacity(self.len());
        self.scan(|_, value| {
            values.push(value.clone());
            true
        });
        values
    }

    /// All keys and values, in key order.
    pub fn key_values(&self) -> (Vec<K>, Vec<V>) {
        let mut keys = Vec::with_capacity(self.len());
        let mut values = Vec::with_capacity(self.len());
        self.scan(|key, value| {
            keys.push(key.clone());
            values.push(value.clone());
            true
        });
        (keys, values)
    }

    /// A reusable bidirectional cursor over the entries.
    pub fn iter(&self) -> MapIter<'_, K, V> {
        MapIter {
            inner: self.tree.iter(),
        }
    }
}

impl<K, V> Default for Map<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for Map<K, V> {
    /// O(1) snapshot; see [`BTree::clone`].
    fn clone(&self) -> Self {
        Map {
            tree: self.tree.clone(),
        }
    }
}

/// Cursor over a [`Map`], yielding `(&key, &value)`.
pub struct MapIter<'a, K, V> {
    inner: Iter<'a, Pair<K, V>>,
}

impl<'a, K, V> MapIter<'a, K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Default + Send + Sync + 'static,
{
    pub fn first(&mut self) -> bool {
        self.inner.first()
    }

    pub fn last(&mut self) -> bool {
        self.inner.last()
    }

    /// Move to the first entry whose key is not below `key`.
    pub fn seek(&mut self, key: &K) -> bool {
        self.inner.seek(&Map::<K, V>::probe(key))
    }

    pub fn next(&mut self) -> bool {
        self.inner.next()
    }

    pub fn prev(&mut self) -> bool {
        self.inner.prev()
    }

    pub fn item(&self) -> Option<(&K, &V)> {
        self.inner.item().map(|pair| (&pair.key, &pair.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete_round_trip() {
        let mut map: Map<u32, String> = Map::new();
        assert_eq!(map.set(1, "one".into()), None);
        assert_eq!(map.set(2, "two".into()), None);
        assert_eq!(map.set(1, "uno".into()), Some("one".into()));
        assert_eq!(map.get(&1).map(String::as_str), Some("uno"));
        assert!(map.contains(&2));
        assert_eq!(map.delete(&1), Some("uno".into()));
        assert_eq!(map.get(&1), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn ordered_accessors() {
        let mut map: Map<u32, u32> = Map::new();
        for i in (0..100).rev() {
            map.set(i, i * 10);
        }
        assert_eq!(map.min(), Some((&0, &0)));
        assert_eq!(map.max(), Some((&99, &990)));
        assert_eq!(map.get_at(42), Some((&42, &420)));
        assert_eq!(map.pop_min(), Some((0, 0)));
        assert_eq!(map.pop_max(), Some((99, 990)));
        assert_eq!(map.delete_at(0), Some((1, 10)));
        assert_eq!(map.len(), 97);
    }

    #[test]
    fn keys_and_values_materialize_in_order() {
        let mut map: Map<u32, u32> = Map::new();
        for i in [5u32, 1, 4, 2, 3] {
            map.set(i, i + 100);
        }
        assert_eq!(map.keys(), vec![1, 2, 3, 4, 5]);
        assert_eq!(map.values(), vec![101, 102, 103, 104, 105]);
        let (keys, values) = map.key_values();
        assert_eq!(keys, map.keys());
        assert_eq!(values, map.values());
    }

    #[test]
    fn get_mut_edits_one_snapshot() {
        let mut map: Map<u32, u32> = Map::new();
        for i in 0..100 {
            map.set(i, 0);
        }
        let snapshot = map.clone();
        *map.get_mut(&7).unwrap() = 99;
        assert_eq!(map.get(&7), Some(&99));
        assert_eq!(snapshot.get(&7), Some(&0));
    }

    #[test]
    fn pivot_scans() {
        let mut map: Map<u32, u32> = Map::new();
        for i in 0..50 {
            map.set(i * 2, i);
        }
        let mut up = Vec::new();
        map.ascend(&51, |&k, _| {
            up.push(k);
            true
        });
        assert_eq!(up.first(), Some(&52));

        let mut down = Vec::new();
        map.descend(&51, |&k, _| {
            down.push(k);
            true
        });
        assert_eq!(down.first(), Some(&50));
    }

    #[test]
    fn cursor_over_entries() {
        let mut map: Map<u32, u32> = Map::new();
        for i in 0..10 {
            map.set(i, i * 2);
        }
        let mut it = map.iter();
        assert!(it.seek(&4));
        assert_eq!(it.item(), Some((&4, &8)));
        assert!(it.next());
        assert_eq!(it.item(), Some((&5, &10)));
    }
}
