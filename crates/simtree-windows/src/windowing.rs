// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splits a `lines` region's shingle sequence into overlapping sliding
//! windows.

use simtree_shingle::Shingle;

/// `window_size`/`stride` (defaults 20/5) and the minimum shingle count a
/// window must have to be considered (`max(1, min_lines / k)`).
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    pub window_size: usize,
    pub stride: usize,
    pub min_shingles: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { window_size: 20, stride: 5, min_shingles: 2 }
    }
}

/// One sliding window over a region's shingles: a first-class
/// `shingle_window` region candidate, carrying the shingle
/// contents needed for MinHash and the line span needed to build a
/// `Region`.
pub struct ShingleWindow {
    pub start_line: usize,
    pub end_line: usize,
    pub contents: Vec<String>,
}

/// Splits `shingles` into overlapping windows, dropping any window with
/// fewer than `min_shingles` shingles (can only happen for the final,
/// short window at the end of a sequence).
#[must_use]
pub fn make_windows(shingles: &[Shingle], config: WindowConfig) -> Vec<ShingleWindow> {
    if shingles.is_empty() || config.window_size == 0 || config.stride == 0 {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + config.window_size).min(shingles.len());
        let slice = &shingles[start..end];
        if slice.len() >= config.min_shingles {
            let start_line = slice.iter().map(|s| s.start_line).min().expect("non-empty slice");
            let end_line = slice.iter().map(|s| s.end_line).max().expect("non-empty slice");
            out.push(ShingleWindow {
                start_line,
                end_line,
                contents: slice.iter().map(|s| s.content.clone()).collect(),
            });
        }
        if end == shingles.len() {
            break;
        }
        start += config.stride;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shingle(n: usize) -> Shingle {
        Shingle { content: format!("s{n}"), start_line: n, end_line: n }
    }

    #[test]
    fn windows_overlap_by_window_size_minus_stride() {
        let shingles: Vec<_> = (1..=10).map(shingle).collect();
        let windows = make_windows(&shingles, WindowConfig { window_size: 4, stride: 2, min_shingles: 1 });
        assert!(windows.len() >= 2);
        assert_eq!(windows[0].contents.len(), 4);
    }

    #[test]
    fn trailing_short_window_dropped_below_min_shingles() {
        let shingles: Vec<_> = (1..=5).map(shingle).collect();
        let windows = make_windows(&shingles, WindowConfig { window_size: 4, stride: 4, min_shingles: 4 });
        // second window only has 1 shingle (index 4), below min_shingles.
        assert!(windows.iter().all(|w| w.contents.len() >= 4));
    }
}
