// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline configuration, `serde`-(de)serializable from TOML.

use serde::{Deserialize, Serialize};
use simtree_rules::RuleSet;

/// Every tunable knob governing shingling, MinHash, LSH grouping,
/// statistical chunking, and window merging, with defaults chosen to
/// match the reference thresholds this project was calibrated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ruleset: RuleSet,

    /// Shingler k-gram size.
    pub shingle_k: usize,
    /// Value-truncation length in bytes.
    pub value_limit: usize,

    /// MinHash permutation count.
    pub minhash_num_perm: usize,

    /// Minimum region/window line span to be considered at all.
    pub min_lines: usize,

    /// Statistical chunking thresholds.
    pub max_freq: f64,
    pub percentile: f64,
    pub max_file_ratio: Option<f64>,
    pub ignore_types: Vec<String>,

    /// Sliding-window parameters for the line pass.
    pub window_size: usize,
    pub stride: usize,
    /// Gap, in lines, within which same-file windows in a group are merged
    /// into one contiguous `lines` region.
    pub merge_gap: usize,

    /// LSH thresholds: region pass vs. line pass.
    pub region_threshold: f64,
    pub region_min_similarity: f64,
    pub line_threshold: f64,
    pub line_min_similarity: f64,
    /// Run the order-sensitive LCS verification pass (default on).
    pub verify: bool,

    /// File-discovery glob filters, delegated to the `ignore` crate.
    pub ignore_patterns: Vec<String>,
    pub ignore_file_patterns: Vec<String>,

    /// Collect `Metrics` alongside the result. Zero-cost when unset.
    pub collect_metrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ruleset: RuleSet::default(),
            shingle_k: 3,
            value_limit: 50,
            minhash_num_perm: 128,
            min_lines: 5,
            max_freq: 0.40,
            percentile: 30.0,
            max_file_ratio: None,
            ignore_types: Vec::new(),
            window_size: 20,
            stride: 5,
            merge_gap: 5,
            region_threshold: 0.85,
            region_min_similarity: 0.75,
            line_threshold: 0.75,
            line_min_similarity: 0.70,
            verify: true,
            ignore_patterns: Vec::new(),
            ignore_file_patterns: Vec::new(),
            collect_metrics: false,
        }
    }
}

impl Config {
    /// Parses a TOML document into a `Config`, filling in defaults for any
    /// field left unspecified.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_calibrated_thresholds() {
        let config = Config::default();
        assert_eq!(config.shingle_k, 3);
        assert_eq!(config.minhash_num_perm, 128);
        assert_eq!(config.min_lines, 5);
        assert_eq!(config.window_size, 20);
        assert_eq!(config.stride, 5);
    }

    #[test]
    fn partial_toml_fills_remaining_defaults() {
        let config = Config::from_toml("shingle_k = 4\n").unwrap();
        assert_eq!(config.shingle_k, 4);
        assert_eq!(config.minhash_num_perm, 128);
    }
}
