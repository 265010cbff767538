// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optional pipeline counters. Zero-cost when unused: only populated
//! when `Config::collect_metrics` is set.

/// Pipeline run counters. Returned alongside [`crate::SimilarityResult`]
/// when requested; otherwise left at its `Default`.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub files_parsed: usize,
    pub files_failed: usize,
    pub regions_extracted: usize,
    pub windows_produced: usize,
    pub region_groups: usize,
    pub line_groups: usize,
}
