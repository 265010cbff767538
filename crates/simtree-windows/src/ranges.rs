// SPDX-License-Identifier: MIT OR Apache-2.0

//! Matched/unmatched line-range bookkeeping (, first two paragraphs).

use std::path::PathBuf;

use simtree_lsh::SimilarRegionGroup;
use simtree_utils::FastMap;

/// The union of line ranges every region-pass group covers, per file.
#[must_use]
pub fn matched_lines(groups: &[SimilarRegionGroup]) -> FastMap<PathBuf, Vec<(usize, usize)>> {
    let mut by_path: FastMap<PathBuf, Vec<(usize, usize)>> = FastMap::default();
    for group in groups {
        for member in &group.members {
            by_path.entry(member.path.clone()).or_default().push((member.start_line, member.end_line));
        }
    }
    by_path
}

/// Merges overlapping or adjacent `(start, end)` ranges into their minimal
/// covering set, sorted ascending.
fn merge_intervals(mut intervals: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    intervals.sort_unstable();
    let mut out: Vec<(usize, usize)> = Vec::new();
    for (start, end) in intervals {
        match out.last_mut() {
            Some(last) if start <= last.1 + 1 => last.1 = last.1.max(end),
            _ => out.push((start, end)),
        }
    }
    out
}

/// Maximal contiguous segments of `[1, line_count]` not covered by
/// `matched`, at least `min_lines` long.
#[must_use]
pub fn unmatched_ranges(line_count: usize, matched: &[(usize, usize)], min_lines: usize) -> Vec<(usize, usize)> {
    if line_count == 0 {
        return Vec::new();
    }
    let merged = merge_intervals(matched.to_vec());
    let mut out = Vec::new();
    let mut cursor = 1usize;

    for (start, end) in merged {
        if start > cursor {
            let gap_end = start - 1;
            if gap_end + 1 - cursor >= min_lines {
                out.push((cursor, gap_end));
            }
        }
        cursor = cursor.max(end + 1);
    }
    if cursor <= line_count && line_count + 1 - cursor >= min_lines {
        out.push((cursor, line_count));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_file_unmatched_when_nothing_covered() {
        let ranges = unmatched_ranges(20, &[], 5);
        assert_eq!(ranges, vec![(1, 20)]);
    }

    #[test]
    fn short_gaps_below_min_lines_are_dropped() {
        // Matched 1-10 and 12-20 leaves a 1-line gap at 11, below min_lines.
        let ranges = unmatched_ranges(20, &[(1, 10), (12, 20)], 5);
        assert!(ranges.is_empty());
    }

    #[test]
    fn long_gap_between_matches_survives() {
        let ranges = unmatched_ranges(30, &[(1, 5), (20, 30)], 5);
        assert_eq!(ranges, vec![(6, 19)]);
    }
}
