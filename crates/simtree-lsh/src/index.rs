// SPDX-License-Identifier: MIT OR Apache-2.0

//! Banded LSH index: groups MinHash signatures into bands so
//! candidate pairs can be found without an all-pairs comparison.

use simtree_minhash::Signature;
use simtree_utils::{hash64, FastMap, FastSet};

pub(crate) struct LshIndex {
    rows_per_band: usize,
    bands: Vec<FastMap<u64, Vec<usize>>>,
}

impl LshIndex {
    pub(crate) fn new(bands: usize, rows_per_band: usize) -> Self {
        Self { rows_per_band, bands: vec![FastMap::default(); bands] }
    }

    pub(crate) fn insert(&mut self, idx: usize, signature: &Signature) {
        for (band_idx, band) in self.bands.iter_mut().enumerate() {
            let Some(slice) = band_slice(signature, band_idx, self.rows_per_band) else { continue };
            band.entry(band_hash(slice)).or_default().push(idx);
        }
    }

    /// Every other index sharing at least one band bucket with `idx`.
    pub(crate) fn candidates(&self, idx: usize, signature: &Signature) -> FastSet<usize> {
        let mut out = FastSet::default();
        for (band_idx, band) in self.bands.iter().enumerate() {
            let Some(slice) = band_slice(signature, band_idx, self.rows_per_band) else { continue };
            if let Some(bucket) = band.get(&band_hash(slice)) {
                out.extend(bucket.iter().copied().filter(|&other| other != idx));
            }
        }
        out
    }
}

fn band_slice(signature: &Signature, band_idx: usize, rows_per_band: usize) -> Option<&[u64]> {
    let start = band_idx * rows_per_band;
    if start >= signature.len() {
        return None;
    }
    let end = (start + rows_per_band).min(signature.len());
    Some(&signature.hashes()[start..end])
}

fn band_hash(slice: &[u64]) -> u64 {
    let mut bytes = Vec::with_capacity(slice.len() * 8);
    for h in slice {
        bytes.extend_from_slice(&h.to_le_bytes());
    }
    hash64(&bytes)
}
