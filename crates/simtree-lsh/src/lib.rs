// SPDX-License-Identifier: MIT OR Apache-2.0

//! Banded LSH candidate search and union-find grouping.

mod grouping;
mod index;
mod union_find;

pub use grouping::{group, LshParams, RegionEntry, SimilarRegionGroup};
