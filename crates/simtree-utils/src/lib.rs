// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hash map/set aliases and deterministic hashing helpers.
//!
//! simtree uses [`rustc_hash::FxHashMap`]/`FxHashSet` as drop-in stand-ins for
//! `std::collections::HashMap`/`HashSet` in hot paths (rule-match caches,
//! per-file line coverage sets) where the default SipHash is needlessly slow
//! and no adversarial input is expected.
//!
//! For anything whose output must be reproducible across runs and platforms
//! (MinHash permutations and their determinism requirement), use [`hash64`] /
//! [`hash64_seeded`] instead of a `Hash` impl driven by a process-random
//! `RandomState` — those two functions are a fixed, seedable 64-bit hash
//! family with no per-process randomization.

mod hash_help;

pub use hash_help::{hash64, hash64_seeded};

/// A fast, non-cryptographic hash map. Iteration order is unspecified and
/// not stable across runs; never rely on it for anything user-visible.
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;
/// A fast, non-cryptographic hash set. See [`FastMap`].
pub type FastSet<T> = rustc_hash::FxHashSet<T>;

/// Creates a new [`FastMap`] with the given capacity pre-reserved.
#[must_use]
pub fn map_with_capacity<K, V>(capacity: usize) -> FastMap<K, V> {
    FastMap::with_capacity_and_hasher(capacity, Default::default())
}

/// Creates a new [`FastSet`] with the given capacity pre-reserved.
#[must_use]
pub fn set_with_capacity<T>(capacity: usize) -> FastSet<T> {
    FastSet::with_capacity_and_hasher(capacity, Default::default())
}
