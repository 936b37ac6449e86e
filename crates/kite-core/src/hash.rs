//! Stable hashing for scope keys and persistent attribute shapes.
//!
//! `ahash` backs every hash unless the `std-hash` feature selects the
//! standard library's SipHash.

use std::hash::{Hash, Hasher};

use crate::Key;

#[cfg(feature = "std-hash")]
type KeyHasher = std::collections::hash_map::DefaultHasher;

#[cfg(not(feature = "std-hash"))]
type KeyHasher = ahash::AHasher;

/// Hashes `value` with the active key hasher.
///
/// Both backends are deterministic within a process; keys must not be
/// persisted.
#[inline]
pub fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = KeyHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Derives an explicit scope key from any hashable value.
#[inline]
pub fn key_of<T: Hash + ?Sized>(value: &T) -> Key {
    hash_one(value)
}
