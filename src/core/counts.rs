/// Insertion-ordered occurrence counts
///
/// Ranked views sort by count descending and break ties by the order in which
/// keys were first counted, so reports are deterministic.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone)]
pub struct CountTable<K> {
    entries: Vec<(K, usize)>,
    index: HashMap<K, usize>,
}

impl<K> Default for CountTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> CountTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: K) {
        self.add(key, 1);
    }

    /// Add `count` occurrences of `key`, appending the key if it is new
    pub fn add(&mut self, key: K, count: usize) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, count));
            }
        }
    }

    /// Count for `key`, or `None` if it was never counted
    pub fn get(&self, key: &K) -> Option<usize> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    /// Fold another table into this one
    ///
    /// Counts are added exactly. Keys unseen here are appended in the other
    /// table's insertion order, so merging shards in scan order reproduces
    /// the sequential insertion order.
    pub fn merge(&mut self, other: CountTable<K>) {
        for (key, count) in other.entries {
            self.add(key, count);
        }
    }

    /// Entries sorted by count descending, ties in insertion order
    pub fn ranked(&self) -> Vec<(&K, usize)> {
        let mut ranked: Vec<_> = self.entries.iter().map(|(key, count)| (key, *count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// The index is derived from the entries, so comparing entries is enough
impl<K: PartialEq> PartialEq for CountTable<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq> Eq for CountTable<K> {}

impl<K: Serialize> Serialize for CountTable<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_get() {
        let mut table = CountTable::new();
        table.increment("cure");
        table.increment("drug");
        table.increment("cure");

        assert_eq!(table.get(&"cure"), Some(2));
        assert_eq!(table.get(&"drug"), Some(1));
        assert_eq!(table.get(&"absent"), None);
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn test_ranked_is_stable_on_ties() {
        let mut table = CountTable::new();
        for key in ["b", "a", "c", "a", "d", "c"] {
            table.increment(key);
        }

        let ranked: Vec<_> = table.ranked().into_iter().map(|(k, c)| (*k, c)).collect();
        assert_eq!(ranked, vec![("a", 2), ("c", 2), ("b", 1), ("d", 1)]);
    }

    #[test]
    fn test_merge_adds_and_preserves_order() {
        let mut sequential = CountTable::new();
        for key in ["x", "y", "x", "z", "y", "w"] {
            sequential.increment(key);
        }

        let mut left = CountTable::new();
        for key in ["x", "y", "x"] {
            left.increment(key);
        }
        let mut right = CountTable::new();
        for key in ["z", "y", "w"] {
            right.increment(key);
        }
        left.merge(right);

        assert_eq!(left, sequential);
    }
}
