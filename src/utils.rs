//! Utility functions and traits for `OpenAddressingMap`

use crate::{MapError, OpenAddressingMap};
use std::{borrow::Borrow, hash::BuildHasher, hash::Hash};

/// Extension trait for map implementations that provides additional utility methods
pub trait HashMapExtensions<K, V> {
    /// Returns the keys of the map as a Vec, in storage order
    fn keys(&self) -> Vec<K>;

    /// Returns the values of the map as a Vec, in storage order
    fn values(&self) -> Vec<V>;

    /// Returns true if the map contains the given key
    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;
}

impl<K, V, S> HashMapExtensions<K, V> for OpenAddressingMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn keys(&self) -> Vec<K> {
        self.items().map(|(k, _)| k.clone()).collect()
    }

    fn values(&self) -> Vec<V> {
        self.items().map(|(_, v)| v.clone()).collect()
    }

    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.contains(key)
    }
}

/// Creates an `OpenAddressingMap` sized for the pairs in `iter`.
///
/// The initial capacity is the iterator's lower size hint (at least 1), so a
/// sized source is placed with few or no intermediate resizes.
///
/// # Errors
///
/// Returns [`MapError::InvalidArgument`] if `max_load_factor` is out of range.
pub fn from_iter<K, V, I>(iter: I, max_load_factor: f64) -> Result<OpenAddressingMap<K, V>, MapError>
where
    K: Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    let iter = iter.into_iter();
    let mut map = OpenAddressingMap::new(iter.size_hint().0.max(1), max_load_factor)?;

    for (key, value) in iter {
        map.put(key, value);
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_iter() {
        let data = vec![("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)];

        let map = from_iter(data, 0.65).unwrap();

        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(map.get("c"), Some(&3));
        assert_eq!(map.len(), 3);
        assert!(map.load_factor() <= 0.65);
    }

    #[test]
    fn test_from_iter_rejects_bad_load_factor() {
        let result = from_iter(vec![(1, 1)], 1.0);
        assert!(matches!(result, Err(MapError::InvalidArgument(_))));
    }

    #[test]
    fn test_keys_and_values() {
        let mut map = OpenAddressingMap::with_defaults();
        map.put("a".to_string(), 1);
        map.put("b".to_string(), 2);
        map.put("c".to_string(), 3);
        map.remove("b");

        let mut keys = map.keys();
        keys.sort(); // Sort for predictable comparison

        let mut values = map.values();
        values.sort_unstable();

        assert_eq!(keys, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn test_contains_key() {
        let mut map = OpenAddressingMap::with_defaults();
        map.put("a".to_string(), 1);

        assert!(map.contains_key("a"));
        assert!(!map.contains_key("b"));
    }
}
