// SPDX-License-Identifier: MIT OR Apache-2.0

//! Candidate grouping, average-similarity filtering, and optional
//! order-sensitive verification.

use simtree_minhash::{jaccard, Signature};
use simtree_regions::Region;
use simtree_utils::FastMap;

use crate::index::LshIndex;
use crate::union_find::UnionFind;

/// Tunables for one LSH pass. Region-mode and line-mode passes
/// use separate instances with different thresholds.
#[derive(Debug, Clone)]
pub struct LshParams {
    pub bands: usize,
    pub rows_per_band: usize,
    /// Candidate-pair acceptance threshold, capped :
    /// `τ_lsh = min(configured_threshold, 0.98)`.
    pub threshold: f64,
    /// Floor a group's average pairwise similarity must clear to survive.
    pub min_similarity: f64,
    /// Whether to run the order-sensitive LCS verification pass.
    pub verify: bool,
}

impl Default for LshParams {
    fn default() -> Self {
        Self { bands: 32, rows_per_band: 4, threshold: 0.85, min_similarity: 0.75, verify: true }
    }
}

impl LshParams {
    fn capped_threshold(&self) -> f64 {
        self.threshold.min(0.98)
    }
}

/// One region's signature plus its ordered shingle content sequence (kept
/// only for the optional LCS verification pass — the grouping pass itself
/// only needs the MinHash signature).
pub struct RegionEntry {
    pub region: Region,
    pub signature: Signature,
    pub shingle_sequence: Vec<String>,
}

/// Two or more regions judged similar, sorted internally by nothing in
/// particular; consumers sort the returned `Vec` by descending similarity.
#[derive(Debug, Clone)]
pub struct SimilarRegionGroup {
    pub members: Vec<Region>,
    pub similarity: f64,
}

/// Runs one LSH pass over `entries`: builds a banded index, unions
/// candidate pairs clearing `threshold`, keeps components whose average
/// pairwise similarity clears `min_similarity`, then (if `params.verify`)
/// recomputes group similarity with order-sensitive LCS and re-filters.
#[must_use]
pub fn group(entries: &[RegionEntry], params: &LshParams) -> Vec<SimilarRegionGroup> {
    if entries.len() < 2 {
        return Vec::new();
    }
    let threshold = params.capped_threshold();

    let mut index = LshIndex::new(params.bands, params.rows_per_band);
    for (i, entry) in entries.iter().enumerate() {
        index.insert(i, &entry.signature);
    }

    let mut uf = UnionFind::new(entries.len());
    let mut pair_similarity: FastMap<(usize, usize), f64> = FastMap::default();

    for (i, entry) in entries.iter().enumerate() {
        for j in index.candidates(i, &entry.signature) {
            if j <= i {
                continue;
            }
            if line_overlaps(&entries[i].region, &entries[j].region) {
                continue;
            }
            let sim = jaccard(&entry.signature, &entries[j].signature);
            if sim >= threshold {
                pair_similarity.insert((i, j), sim);
                uf.union(i, j);
            }
        }
    }

    let mut components: FastMap<usize, Vec<usize>> = FastMap::default();
    for i in 0..entries.len() {
        components.entry(uf.find(i)).or_default().push(i);
    }

    let mut groups = Vec::new();
    for members in components.into_values() {
        if members.len() < 2 {
            continue;
        }
        let Some(avg) = average_pairwise(&members, &pair_similarity) else { continue };
        if avg < params.min_similarity {
            continue;
        }
        groups.push(SimilarRegionGroup {
            members: members.iter().map(|&i| entries[i].region.clone()).collect(),
            similarity: avg,
        });
    }

    if params.verify {
        groups = groups
            .into_iter()
            .filter_map(|group| verify_group(group, entries, params.min_similarity))
            .collect();
    }

    groups.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
    groups
}

fn line_overlaps(a: &Region, b: &Region) -> bool {
    a.path == b.path && a.start_line <= b.end_line && b.start_line <= a.end_line
}

fn average_pairwise(members: &[usize], pair_similarity: &FastMap<(usize, usize), f64>) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0usize;
    for (idx, &a) in members.iter().enumerate() {
        for &b in &members[idx + 1..] {
            let key = if a < b { (a, b) } else { (b, a) };
            // Two members can end up in the same component via a
            // transitive chain without ever being directly compared; skip
            // those untested pairs rather than treating them as 0.
            if let Some(&sim) = pair_similarity.get(&key) {
                total += sim;
                count += 1;
            }
        }
    }
    (count > 0).then(|| total / count as f64)
}

/// Recomputes group similarity using longest-common-subsequence over each
/// pair's ordered shingle sequence rather than the unordered MinHash set
/// ( "Verification"), averaging over every pair and re-checking
/// `min_similarity`.
fn verify_group(group: SimilarRegionGroup, entries: &[RegionEntry], min_similarity: f64) -> Option<SimilarRegionGroup> {
    let indices: Vec<usize> = group
        .members
        .iter()
        .filter_map(|region| entries.iter().position(|e| e.region == *region))
        .collect();

    let mut total = 0.0;
    let mut count = 0usize;
    for (pos, &i) in indices.iter().enumerate() {
        for &j in &indices[pos + 1..] {
            let a = &entries[i].shingle_sequence;
            let b = &entries[j].shingle_sequence;
            let lcs_len = lcs_length(a, b);
            let denom = (a.len() + b.len()) as f64 / 2.0;
            let score = if denom > 0.0 { lcs_len as f64 / denom } else { 0.0 };
            total += score;
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    let similarity = total / count as f64;
    if similarity < min_similarity {
        return None;
    }
    Some(SimilarRegionGroup { members: group.members, similarity })
}

/// Standard O(|a|*|b|) dynamic-programming longest common subsequence
/// length over shingle-content sequences ("order-sensitive
/// similarity using longest common subsequence").
fn lcs_length(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y { prev[j] + 1 } else { prev[j + 1].max(curr[j]) };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtree_languages::LanguageTag;
    use simtree_minhash::{MinHashConfig, MinHasher};
    use simtree_rules::RegionKind;
    use std::path::PathBuf;

    fn region(path: &str, start: usize, end: usize) -> Region {
        Region::new(PathBuf::from(path), LanguageTag::Python, RegionKind::Function, "f", start, end)
    }

    fn entry(path: &str, start: usize, end: usize, shingles: &[&str]) -> RegionEntry {
        let hasher = MinHasher::new(MinHashConfig { num_permutations: 32 });
        let sequence: Vec<String> = shingles.iter().map(|s| s.to_string()).collect();
        let signature = hasher.sketch(sequence.iter().map(String::as_str));
        RegionEntry { region: region(path, start, end), signature, shingle_sequence: sequence }
    }

    #[test]
    fn identical_regions_in_different_files_group() {
        let shingles = ["a", "b", "c", "d", "e"];
        let entries = vec![entry("a.py", 1, 5, &shingles), entry("b.py", 1, 5, &shingles)];
        let params = LshParams { verify: false, ..LshParams::default() };
        let groups = group(&entries, &params);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn overlapping_regions_in_the_same_file_never_group() {
        let shingles = ["a", "b", "c", "d", "e"];
        let entries = vec![entry("a.py", 1, 5, &shingles), entry("a.py", 3, 7, &shingles)];
        let groups = group(&entries, &LshParams::default());
        assert!(groups.is_empty());
    }

    #[test]
    fn lcs_length_matches_known_sequences() {
        let a = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let b = vec!["x".to_string(), "z".to_string()];
        assert_eq!(lcs_length(&a, &b), 2);
    }
}
