use std::{
    borrow::Borrow,
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{BuildHasher, BuildHasherDefault, Hash},
    iter::FusedIterator,
    mem, slice, vec,
};

use crate::MapError;

/// Slot count used by [`OpenAddressingMap::with_defaults`]
pub const DEFAULT_CAPACITY: usize = 8;

/// Load factor threshold used by [`OpenAddressingMap::with_defaults`]
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.65;

/// Hash strategy used when none is supplied.
///
/// `DefaultHasher::new()` always starts from the same keys, so placement is
/// reproducible across runs and processes.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;

/// One cell of the backing storage
#[derive(Debug, Clone)]
enum Slot<K, V> {
    /// Never written since the last rebuild; terminates a probe
    Empty,
    /// Holds a live entry
    Occupied(K, V),
    /// A removed entry; probes continue past it
    Tombstone,
}

/// Result of walking the probe sequence for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Probe {
    /// Where a new entry for the key belongs: the first tombstone seen, else
    /// the terminating empty slot. `None` only if the scan saw neither.
    insert_at: Option<usize>,
    /// Position of the live entry holding the key
    found: Option<usize>,
    /// Number of slots inspected
    visited: usize,
}

/// A hash map using open addressing with linear probing.
///
/// Removal leaves a tombstone so that keys further along the same probe sequence
/// stay reachable. Growth is driven by `used` (live entries plus tombstones), not
/// by the number of live entries: a delete-heavy workload that never grows still
/// ends up doubling the table, which discards every tombstone and keeps probe
/// sequences short.
///
/// Capacity is always a power of two, so the home slot of a key is its hash
/// masked by `capacity - 1`.
///
/// Note: This implementation is not thread-safe.
#[derive(Clone)]
pub struct OpenAddressingMap<K, V, S = DefaultHashBuilder> {
    /// Backing storage, `capacity` slots long
    slots: Vec<Slot<K, V>>,
    /// Number of occupied slots
    size: usize,
    /// Number of occupied slots plus tombstones
    used: usize,
    /// Upper bound on `used / capacity` after any `put`
    max_load_factor: f64,
    /// Builds the hasher applied to every key
    hash_builder: S,
}

impl<K, V> Default for OpenAddressingMap<K, V> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<K, V> OpenAddressingMap<K, V> {
    /// Creates a map with at least `initial_capacity` slots that grows once
    /// `used / capacity` would pass `max_load_factor`.
    ///
    /// The capacity is rounded up to the next power of two.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidArgument`] if `initial_capacity` is zero or
    /// `max_load_factor` is not strictly between 0 and 1.
    ///
    /// ```rust
    /// use openmap::{MapError, OpenAddressingMap};
    ///
    /// let map = OpenAddressingMap::<&str, i32>::new(5, 0.65).unwrap();
    /// assert_eq!(map.capacity(), 8);
    ///
    /// let err = OpenAddressingMap::<&str, i32>::new(0, 0.65).unwrap_err();
    /// assert!(matches!(err, MapError::InvalidArgument(_)));
    /// ```
    pub fn new(initial_capacity: usize, max_load_factor: f64) -> Result<Self, MapError> {
        Self::with_hasher(initial_capacity, max_load_factor, DefaultHashBuilder::default())
    }

    /// Creates a map with [`DEFAULT_CAPACITY`] slots and [`DEFAULT_MAX_LOAD_FACTOR`]
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::from_parts(DEFAULT_CAPACITY, DEFAULT_MAX_LOAD_FACTOR, DefaultHashBuilder::default())
    }
}

impl<K, V, S> OpenAddressingMap<K, V, S> {
    /// Creates a map that hashes keys with `hash_builder`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`OpenAddressingMap::new`].
    pub fn with_hasher(
        initial_capacity: usize,
        max_load_factor: f64,
        hash_builder: S,
    ) -> Result<Self, MapError> {
        if initial_capacity < 1 {
            return Err(MapError::InvalidArgument(format!(
                "initial_capacity must be at least 1, got {initial_capacity}"
            )));
        }
        if !(max_load_factor > 0.0 && max_load_factor < 1.0) {
            return Err(MapError::InvalidArgument(format!(
                "max_load_factor must lie strictly between 0 and 1, got {max_load_factor}"
            )));
        }
        Ok(Self::from_parts(initial_capacity, max_load_factor, hash_builder))
    }

    /// Builds the map from already validated parameters
    fn from_parts(initial_capacity: usize, max_load_factor: f64, hash_builder: S) -> Self {
        let capacity = initial_capacity.max(1).next_power_of_two();
        log::trace!("creating map with {capacity} slots, max load factor {max_load_factor}");
        Self { slots: empty_slots(capacity), size: 0, used: 0, max_load_factor, hash_builder }
    }

    /// Returns the number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the map holds no live entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots in the backing storage
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of slots that are occupied or hold a tombstone
    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Returns the number of tombstones waiting for the next resize
    #[must_use]
    pub fn tombstones(&self) -> usize {
        self.used.saturating_sub(self.size)
    }

    /// Returns `used / capacity`, the ratio that drives growth
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.used as f64 / self.slots.len() as f64
    }

    /// Returns the growth threshold supplied at construction
    #[must_use]
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Returns a reference to the map's hash builder
    #[must_use]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns an iterator over the live entries in storage order.
    ///
    /// Every call starts a fresh pass. The iterator borrows the map, so the map
    /// cannot be modified until it is dropped.
    #[must_use]
    pub fn items(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter(), remaining: self.size }
    }

    /// Alias of [`OpenAddressingMap::items`]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.items()
    }

    /// Removes every entry and tombstone, keeping the current capacity
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.size = 0;
        self.used = 0;
    }

    /// Position mask; valid because the slot count is a power of two
    fn mask(&self) -> usize {
        self.slots.len().wrapping_sub(1)
    }

    /// Returns true if `used` entries in `capacity` slots would pass the threshold
    #[allow(clippy::cast_precision_loss)]
    fn exceeds_load_factor(&self, used: usize, capacity: usize) -> bool {
        used as f64 / capacity as f64 > self.max_load_factor
    }
}

impl<K, V, S> OpenAddressingMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Computes the hash for a key
    fn hash<Q: ?Sized + Hash>(&self, key: &Q) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// Home slot of a key
    #[allow(clippy::cast_possible_truncation)]
    fn index<Q: ?Sized + Hash>(&self, key: &Q) -> usize {
        (self.hash(key) as usize) & self.mask()
    }

    /// Walks the linear probe sequence of `key`, wrapping at the end of storage,
    /// for at most `capacity` steps.
    fn probe<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mask = self.mask();
        let mut index = self.index(key);
        let mut first_tombstone = None;

        for visited in 1..=self.slots.len() {
            match self.slots.get(index) {
                None | Some(Slot::Empty) => {
                    return Probe {
                        insert_at: Some(first_tombstone.unwrap_or(index)),
                        found: None,
                        visited,
                    };
                }
                Some(Slot::Tombstone) => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
                Some(Slot::Occupied(stored, _)) if stored.borrow() == key => {
                    return Probe { insert_at: Some(index), found: Some(index), visited };
                }
                Some(Slot::Occupied(..)) => {}
            }
            index = index.wrapping_add(1) & mask;
        }

        // No empty slot anywhere: the load factor bound has been broken.
        log::error!(
            "probe sequence exhausted after {} slots (size {}, used {})",
            self.slots.len(),
            self.size,
            self.used
        );
        Probe { insert_at: first_tombstone, found: None, visited: self.slots.len() }
    }

    /// Inserts a key-value pair, returning the previous value if the key was
    /// already present.
    ///
    /// If `(used + 1) / capacity` would exceed the maximum load factor, the map
    /// first doubles its capacity (repeatedly, for very small tables). An update
    /// keeps the stored key and leaves `len` and `used` unchanged. A new key
    /// reuses the first tombstone on its probe sequence when there is one.
    ///
    /// # Panics
    ///
    /// Panics if the probe sequence holds no empty slot and no tombstone, which
    /// the load factor bound rules out.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        while self.exceeds_load_factor(self.used.saturating_add(1), self.slots.len()) {
            self.resize(self.slots.len().saturating_mul(2));
        }
        self.place(key, value)
    }

    /// Probes for `key` in the current storage and writes the entry
    #[allow(clippy::panic)]
    fn place(&mut self, key: K, value: V) -> Option<V> {
        let probe = self.probe(&key);

        if let Some(found) = probe.found {
            if let Some(Slot::Occupied(_, current)) = self.slots.get_mut(found) {
                return Some(mem::replace(current, value));
            }
        }

        let Some(index) = probe.insert_at else {
            panic!(
                "no insertion point for a new key: all {} slots hold other live entries",
                self.slots.len()
            );
        };

        if let Some(slot) = self.slots.get_mut(index) {
            // Reusing a tombstone does not add to `used`.
            if matches!(slot, Slot::Empty) {
                self.used = self.used.saturating_add(1);
            }
            *slot = Slot::Occupied(key, value);
            self.size = self.size.saturating_add(1);
        }
        None
    }

    /// Retrieve a value for a given key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.slots.get(self.probe(key).found?) {
            Some(Slot::Occupied(_, value)) => Some(value),
            _ => None,
        }
    }

    /// Retrieve the value for `key`, or `default` when the key is absent
    ///
    /// ```rust
    /// use openmap::OpenAddressingMap;
    ///
    /// let mut map = OpenAddressingMap::with_defaults();
    /// map.put("a", 1);
    /// assert_eq!(*map.get_or("a", &0), 1);
    /// assert_eq!(*map.get_or("b", &0), 0);
    /// ```
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Get a mutable reference to a value for a given key
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.probe(key).found?;
        match self.slots.get_mut(found) {
            Some(Slot::Occupied(_, value)) => Some(value),
            _ => None,
        }
    }

    /// Returns true if the map holds a live entry for `key`
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.probe(key).found.is_some()
    }

    /// Removes `key`, returning true if it was present.
    ///
    /// The slot becomes a tombstone; `used` does not change until the next resize.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Removes `key` and hands back the stored key and value
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.probe(key).found?;
        let slot = self.slots.get_mut(found)?;
        match mem::replace(slot, Slot::Tombstone) {
            Slot::Occupied(stored, value) => {
                self.size = self.size.saturating_sub(1);
                Some((stored, value))
            }
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Rebuilds the storage with `new_capacity` slots.
    ///
    /// The capacity is rounded up to a power of two and never drops below the
    /// current one. Live entries are re-placed by rehashing them into the new
    /// storage; tombstones are dropped, so `used == len()` afterwards.
    pub fn resize(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(self.slots.len()).next_power_of_two();
        log::debug!(
            "resizing from {} to {} slots: {} live entries, {} tombstones discarded",
            self.slots.len(),
            new_capacity,
            self.size,
            self.tombstones()
        );

        let old = mem::replace(&mut self.slots, empty_slots(new_capacity));
        self.size = 0;
        self.used = 0;

        for slot in old {
            if let Slot::Occupied(key, value) = slot {
                self.place(key, value);
            }
        }
    }

    /// Returns how many slots a lookup of `key` inspects, including the one
    /// that ends the search.
    pub fn probe_length<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.probe(key).visited
    }
}

/// Allocates `capacity` empty slots without requiring `Clone`
fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || Slot::Empty);
    slots
}

impl<K, V, S> fmt::Debug for OpenAddressingMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for OpenAddressingMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for OpenAddressingMap<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_defaults();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a OpenAddressingMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

impl<K, V, S> IntoIterator for OpenAddressingMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { slots: self.slots.into_iter(), remaining: self.size }
    }
}

/// Iterator over the live entries of an [`OpenAddressingMap`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Slots not yet visited
    slots: slice::Iter<'a, Slot<K, V>>,
    /// Live entries not yet yielded
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.by_ref().find_map(|slot| match slot {
            Slot::Occupied(key, value) => Some((key, value)),
            Slot::Empty | Slot::Tombstone => None,
        })?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Owning iterator over the live entries of an [`OpenAddressingMap`]
#[derive(Debug)]
pub struct IntoIter<K, V> {
    /// Slots not yet visited
    slots: vec::IntoIter<Slot<K, V>>,
    /// Live entries not yet yielded
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.by_ref().find_map(|slot| match slot {
            Slot::Occupied(key, value) => Some((key, value)),
            Slot::Empty | Slot::Tombstone => None,
        })?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}
