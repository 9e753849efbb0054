//! # Open Addressing Map
//!
//! A Rust implementation of a hash map backed by open addressing with linear probing.
//!
//! [`OpenAddressingMap`] keeps every entry in one power-of-two sized array of slots.
//! A key is stored on the probe sequence that starts at its hash masked by the
//! capacity and walks forward one slot at a time, wrapping at the end of storage.
//!
//! - Removal leaves a tombstone so later keys on the same sequence stay reachable.
//! - New keys reuse the first tombstone on their sequence.
//! - Growth is triggered by occupied slots *plus* tombstones, so delete/insert churn
//!   alone eventually doubles the table and clears every tombstone.
//!
//! ## Basic Usage
//!
//! ```rust
//! use openmap::OpenAddressingMap;
//!
//! // Create a map with 8 slots that grows past a 0.65 load factor
//! let mut map = OpenAddressingMap::new(8, 0.65).unwrap();
//!
//! // Insert and update values
//! map.put("a", 1);
//! map.put("b", 2);
//! map.put("a", 10);
//!
//! assert_eq!(map.get("a"), Some(&10));
//! assert_eq!(*map.get_or("c", &0), 0);
//! assert_eq!(map.len(), 2);
//!
//! // Remove values
//! assert!(map.remove("b"));
//! assert!(!map.contains("b"));
//!
//! let items: Vec<_> = map.items().collect();
//! assert_eq!(items, vec![(&"a", &10)]);
//! ```
//!
//! ## Custom Hashing
//!
//! ```rust
//! use openmap::OpenAddressingMap;
//! use std::collections::hash_map::RandomState;
//!
//! let mut map = OpenAddressingMap::with_hasher(16, 0.5, RandomState::new()).unwrap();
//! map.put(1_u32, "one");
//! assert!(map.contains(&1));
//! ```

/// Error type returned by map constructors
mod error;
/// Module implementing the open addressing map with linear probing
mod open_addressing_map;
/// Utility functions and traits for the map
mod utils;

pub use error::MapError;
pub use open_addressing_map::{
    DEFAULT_CAPACITY, DEFAULT_MAX_LOAD_FACTOR, DefaultHashBuilder, IntoIter, Iter,
    OpenAddressingMap,
};
pub use utils::{HashMapExtensions, from_iter};
