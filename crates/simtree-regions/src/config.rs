// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tunables for statistical auto-chunking.

use simtree_utils::FastSet;

/// Thresholds the statistical extractor applies, in order, to the
/// candidate chunks it finds in each file: frequency filter, percentile
/// filter, file-ratio filter, ignore-types filter.
#[derive(Debug, Clone)]
pub struct RegionConfig {
    /// Minimum line span for a node to be considered a chunk candidate.
    pub min_lines: usize,
    /// Drop a candidate whose `kind` makes up more than this fraction of
    /// the file's candidates (default threshold; the sample pre-pass can
    /// tighten this per-language).
    pub max_freq: f64,
    /// Drop candidates below this percentile of the file's candidate size
    /// distribution (0-100).
    pub percentile: f64,
    /// Optional cap on a candidate's size as a fraction of the file's total
    /// line count.
    pub max_file_ratio: Option<f64>,
    /// Node kinds never considered as chunk candidates.
    pub ignore_types: FastSet<String>,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            min_lines: 5,
            max_freq: 0.40,
            percentile: 30.0,
            max_file_ratio: None,
            ignore_types: FastSet::default(),
        }
    }
}

/// The sample pre-pass' over-frequency trigger and the
/// tightened threshold it applies to every subsequent file in the language
/// group once tripped.
pub(crate) const SAMPLE_SIZE: usize = 5;
pub(crate) const SAMPLE_TRIGGER_FREQ: f64 = 0.50;
pub(crate) const SAMPLE_TIGHTENED_FREQ: f64 = 0.30;
