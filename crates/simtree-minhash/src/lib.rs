// SPDX-License-Identifier: MIT OR Apache-2.0

//! MinHash sketching: turns a region's shingle set into a fixed-width
//! signature under a deterministic hash permutation family, so
//! similarity can be estimated in O(signature length) instead of O(shingle
//! count) per pair.

use simtree_utils::hash64_seeded;

/// Number of hash permutations (default: 128).
#[derive(Debug, Clone, Copy)]
pub struct MinHashConfig {
    pub num_permutations: usize,
}

impl Default for MinHashConfig {
    fn default() -> Self {
        Self { num_permutations: 128 }
    }
}

/// A fixed-width MinHash signature. `empty` distinguishes a region with no
/// shingles from one that merely hashed to the sentinel value, since two
/// empty regions are defined as 0% similar rather than identical — an
/// explicit override of the degenerate "both empty ⇒ identical" case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    hashes: Vec<u64>,
    empty: bool,
}

impl Signature {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    #[must_use]
    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }
}

/// Computes every permutation's seed once, so the same family is reused
/// for every region sketched (deterministic across runs and
/// platforms — no process-random hashing anywhere in this family).
pub struct MinHasher {
    config: MinHashConfig,
    seeds: Vec<u64>,
}

impl MinHasher {
    #[must_use]
    pub fn new(config: MinHashConfig) -> Self {
        let seeds = (0..config.num_permutations as u64)
            .map(|i| hash64_seeded(b"simtree-minhash-permutation", i))
            .collect();
        Self { config, seeds }
    }

    /// Sketches the *set* of shingle contents (duplicates collapse). An
    /// empty set produces the sentinel signature.
    #[must_use]
    pub fn sketch<'a, I>(&self, shingles: I) -> Signature
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: simtree_utils::FastSet<&str> = shingles.into_iter().collect();
        if unique.is_empty() {
            return Signature { hashes: vec![u64::MAX; self.config.num_permutations], empty: true };
        }

        let mut hashes = vec![u64::MAX; self.seeds.len()];
        for item in unique {
            let bytes = item.as_bytes();
            for (slot, &seed) in hashes.iter_mut().zip(&self.seeds) {
                let h = hash64_seeded(bytes, seed);
                if h < *slot {
                    *slot = h;
                }
            }
        }
        Signature { hashes, empty: false }
    }
}

/// Estimated Jaccard similarity between two signatures, with the
/// empty-set override: two empty signatures compare as 0, not 1.
#[must_use]
pub fn jaccard(a: &Signature, b: &Signature) -> f64 {
    if a.empty || b.empty {
        return 0.0;
    }
    if a.hashes.is_empty() || a.hashes.len() != b.hashes.len() {
        return 0.0;
    }
    let matches = a.hashes.iter().zip(&b.hashes).filter(|(x, y)| x == y).count();
    matches as f64 / a.hashes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_shingle_sets_produce_identical_signatures() {
        let hasher = MinHasher::new(MinHashConfig::default());
        let a = hasher.sketch(["x", "y", "z"]);
        let b = hasher.sketch(["z", "y", "x"]);
        assert_eq!(a, b);
        assert!((jaccard(&a, &b) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_vs_empty_is_zero_not_one() {
        let hasher = MinHasher::new(MinHashConfig::default());
        let a = hasher.sketch(std::iter::empty());
        let b = hasher.sketch(std::iter::empty());
        assert!(a.is_empty());
        assert!(b.is_empty());
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn disjoint_sets_have_low_similarity() {
        let hasher = MinHasher::new(MinHashConfig::default());
        let a = hasher.sketch(["alpha", "beta", "gamma"]);
        let b = hasher.sketch(["delta", "epsilon", "zeta"]);
        assert!(jaccard(&a, &b) < 0.5);
    }

    #[test]
    fn deterministic_across_instances() {
        let a = MinHasher::new(MinHashConfig::default()).sketch(["alpha", "beta"]);
        let b = MinHasher::new(MinHashConfig::default()).sketch(["alpha", "beta"]);
        assert_eq!(a, b);
    }
}
