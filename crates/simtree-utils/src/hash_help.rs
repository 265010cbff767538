// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic 64-bit hashing, used by MinHash permutations, which must
//! be reproducible across runs and platforms.

/// Hashes a byte slice with `rapidhash`'s fixed-secret v3 variant (no
/// process-random seed). Use when two runs of the pipeline on the same
/// input must produce bit-identical output.
#[inline]
#[must_use]
pub fn hash64(bytes: &[u8]) -> u64 {
    rapidhash::v3::rapidhash_v3(bytes)
}

/// Hashes a byte slice with an explicit seed, for MinHash's `num_perm`
/// independent hash functions: permutation `i` hashes with seed `i`.
#[inline]
#[must_use]
pub fn hash64_seeded(bytes: &[u8], seed: u64) -> u64 {
    let secrets = rapidhash::v3::RapidSecrets::seed(seed);
    rapidhash::v3::rapidhash_v3_seeded(bytes, &secrets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_across_calls() {
        let a = hash64(b"hello world");
        let b = hash64(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = hash64_seeded(b"shingle content", 0);
        let b = hash64_seeded(b"shingle content", 1);
        assert_ne!(a, b);
    }
}
