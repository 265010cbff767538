// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statistical auto-chunking: finds structurally meaningful
//! spans in languages or files an explicit rule doesn't cover, without any
//! per-language code.

use simtree_ast::Node;
use simtree_utils::{FastMap, FastSet};

use crate::config::RegionConfig;

const MIN_TOTAL_CHUNKS: usize = 10;

/// The deepest nodes in `root` that span at least `min_lines` lines and
/// have no child that also does — i.e. the most specific node at which a
/// "chunk" boundary can be drawn ("a leaf node with no
/// chunk-sized children").
pub(crate) fn candidate_chunks<'tree>(root: Node<'tree>, min_lines: usize) -> Vec<Node<'tree>> {
    let mut out = Vec::new();
    collect(root, min_lines, &mut out);
    out
}

fn collect<'tree>(node: Node<'tree>, min_lines: usize, out: &mut Vec<Node<'tree>>) {
    let (start, end) = node.line_range();
    if end - start + 1 < min_lines {
        return;
    }
    let has_chunk_child = node
        .children()
        .any(|c| {
            let (cs, ce) = c.line_range();
            ce - cs + 1 >= min_lines
        });
    if has_chunk_child {
        for child in node.children() {
            collect(child, min_lines, out);
        }
    } else {
        out.push(node);
    }
}

/// `kind -> count` over a candidate set, used both by the sample pre-pass
/// and by per-file filtering.
pub(crate) fn frequency_table(candidates: &[Node<'_>]) -> FastMap<&'static str, usize> {
    let mut table = FastMap::default();
    for node in candidates {
        *table.entry(node.kind()).or_insert(0) += 1;
    }
    table
}

/// Applies the frequency / percentile / file-ratio / ignore-types filters
/// in sequence, returning the survivors.
pub(crate) fn filter_candidates<'tree>(
    candidates: Vec<Node<'tree>>,
    config: &RegionConfig,
    max_freq: f64,
    file_line_count: usize,
) -> Vec<Node<'tree>> {
    if candidates.is_empty() {
        return candidates;
    }

    // 1. Frequency filter. Skipped outright below `MIN_TOTAL_CHUNKS`: a
    // handful of chunks sharing one kind (e.g. 3 `block` nodes, 100% of 3)
    // would otherwise all be dropped for a sample too small to judge.
    let after_freq = if candidates.len() < MIN_TOTAL_CHUNKS {
        candidates
    } else {
        let freq = frequency_table(&candidates);
        let total = candidates.len() as f64;
        candidates.into_iter().filter(|n| (freq[n.kind()] as f64 / total) <= max_freq).collect()
    };
    if after_freq.is_empty() {
        return after_freq;
    }

    // 2. Percentile filter over line-span sizes.
    let mut sizes: Vec<usize> = after_freq
        .iter()
        .map(|n| {
            let (s, e) = n.line_range();
            e - s + 1
        })
        .collect();
    sizes.sort_unstable();
    let cutoff_idx = ((config.percentile / 100.0) * sizes.len() as f64).floor() as usize;
    let cutoff = sizes.get(cutoff_idx.min(sizes.len() - 1)).copied().unwrap_or(0);
    let after_percentile: Vec<_> = after_freq
        .into_iter()
        .filter(|n| {
            let (s, e) = n.line_range();
            (e - s + 1) >= cutoff
        })
        .collect();

    // 3. File-ratio filter.
    let after_ratio: Vec<_> = match config.max_file_ratio {
        Some(ratio) if file_line_count > 0 => after_percentile
            .into_iter()
            .filter(|n| {
                let (s, e) = n.line_range();
                (e - s + 1) as f64 / file_line_count as f64 <= ratio
            })
            .collect(),
        _ => after_percentile,
    };

    // 4. Ignore-types filter.
    ignore_types(after_ratio, &config.ignore_types)
}

fn ignore_types<'tree>(candidates: Vec<Node<'tree>>, ignore: &FastSet<String>) -> Vec<Node<'tree>> {
    if ignore.is_empty() {
        return candidates;
    }
    candidates.into_iter().filter(|n| !ignore.contains(n.kind())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtree_ast::SourceFile;
    use simtree_languages::LanguageTag;

    #[test]
    fn frequency_filter_is_skipped_below_min_total_chunks() {
        let src = b"if a:\n    x = 1\nif b:\n    y = 2\nif c:\n    z = 3\n";
        let file = SourceFile::parse("t.py", LanguageTag::Python, src).unwrap();
        let candidates = candidate_chunks(file.root(), 1);
        assert!(candidates.len() < MIN_TOTAL_CHUNKS, "test fixture must stay under the threshold");
        let config = RegionConfig::default();
        let survivors = filter_candidates(candidates.clone(), &config, config.max_freq, file.line_count());
        assert_eq!(survivors.len(), candidates.len(), "a small candidate set must bypass the frequency filter entirely");
    }
}
