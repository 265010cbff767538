// SPDX-License-Identifier: MIT OR Apache-2.0

//! Overlap merging for window groups ( last paragraph): windows
//! from the same file that touch or nearly touch collapse into one
//! contiguous `lines` region.

use simtree_lsh::SimilarRegionGroup;
use simtree_regions::Region;
use simtree_rules::RegionKind;
use simtree_utils::FastMap;

/// Merges same-file, overlapping-or-near members of each group into a
/// single `lines` region, dropping groups that fall below 2 members as a
/// result.
#[must_use]
pub fn merge_window_groups(groups: Vec<SimilarRegionGroup>, merge_gap: usize) -> Vec<SimilarRegionGroup> {
    groups.into_iter().filter_map(|group| merge_one(group, merge_gap)).collect()
}

fn merge_one(group: SimilarRegionGroup, merge_gap: usize) -> Option<SimilarRegionGroup> {
    let mut by_path: FastMap<std::path::PathBuf, Vec<Region>> = FastMap::default();
    for member in group.members {
        by_path.entry(member.path.clone()).or_default().push(member);
    }

    let mut merged_members = Vec::new();
    for (_path, mut regions) in by_path {
        regions.sort_by_key(|r| r.start_line);
        let mut current: Option<Region> = None;
        for region in regions {
            match current.take() {
                None => current = Some(as_lines_region(region)),
                Some(mut acc) => {
                    if region.start_line <= acc.end_line + merge_gap + 1 {
                        acc.end_line = acc.end_line.max(region.end_line);
                        acc.start_line = acc.start_line.min(region.start_line);
                        current = Some(acc);
                    } else {
                        merged_members.push(acc);
                        current = Some(as_lines_region(region));
                    }
                }
            }
        }
        if let Some(acc) = current {
            merged_members.push(acc);
        }
    }

    if merged_members.len() < 2 {
        return None;
    }
    Some(SimilarRegionGroup { members: merged_members, similarity: group.similarity })
}

fn as_lines_region(region: Region) -> Region {
    Region::new(region.path, region.language, RegionKind::Lines, region.name, region.start_line, region.end_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtree_languages::LanguageTag;
    use std::path::PathBuf;

    fn window(path: &str, start: usize, end: usize) -> Region {
        Region::new(PathBuf::from(path), LanguageTag::Python, RegionKind::ShingleWindow, "window", start, end)
    }

    #[test]
    fn nearby_windows_in_the_same_file_merge() {
        let group = SimilarRegionGroup {
            members: vec![window("a.py", 1, 10), window("a.py", 12, 20), window("b.py", 1, 20)],
            similarity: 0.9,
        };
        let merged = merge_window_groups(vec![group], 5);
        assert_eq!(merged.len(), 1);
        let a_members: Vec<_> = merged[0].members.iter().filter(|r| r.path == PathBuf::from("a.py")).collect();
        assert_eq!(a_members.len(), 1);
        assert_eq!((a_members[0].start_line, a_members[0].end_line), (1, 20));
    }

    #[test]
    fn merge_dropping_below_two_members_discards_group() {
        let group = SimilarRegionGroup { members: vec![window("a.py", 1, 10), window("a.py", 12, 20)], similarity: 0.9 };
        let merged = merge_window_groups(vec![group], 5);
        assert!(merged.is_empty());
    }
}
