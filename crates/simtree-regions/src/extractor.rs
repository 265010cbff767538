// SPDX-License-Identifier: MIT OR Apache-2.0

//! Region extraction: explicit rule-driven regions, a statistical
//! fallback for file spans no rule covers, a sample pre-pass that
//! tightens the statistical threshold for chatty languages, and a dedup
//! pass where explicit regions always win ties.

use std::path::PathBuf;

use simtree_ast::{Node, SourceFile};
use simtree_languages::LanguageTag;
use simtree_rules::{region_profile, RegionKind, RegionProfile, RuleCatalog, RuleEngine};
use simtree_utils::{FastMap, FastSet};

use crate::chunk::{candidate_chunks, filter_candidates, frequency_table};
use crate::config::{RegionConfig, SAMPLE_SIZE, SAMPLE_TIGHTENED_FREQ, SAMPLE_TRIGGER_FREQ};
use crate::region::Region;

/// A region paired with the AST node it was extracted from. The node
/// borrows from the `SourceFile` that produced it and is discarded once
/// the shingler has consumed it; only the owned [`Region`] survives into
/// later pipeline stages.
pub struct ExtractedRegion<'tree> {
    pub region: Region,
    pub node: Node<'tree>,
}

/// Extracts and filters regions for a batch of parsed files.
pub struct RegionExtractor<'c> {
    catalog: &'c RuleCatalog,
    config: RegionConfig,
}

impl<'c> RegionExtractor<'c> {
    #[must_use]
    pub fn new(catalog: &'c RuleCatalog, config: RegionConfig) -> Self {
        Self { catalog, config }
    }

    /// Runs explicit extraction, the sample pre-pass, and statistical
    /// chunking over every file, grouped by language (/// the pre-pass threshold is per language, not per file).
    pub fn extract_all<'tree>(&self, files: &'tree [SourceFile]) -> Vec<ExtractedRegion<'tree>> {
        let mut by_lang: FastMap<LanguageTag, Vec<&'tree SourceFile>> = FastMap::default();
        for file in files {
            by_lang.entry(file.language()).or_default().push(file);
        }

        let mut out = Vec::new();
        for (lang, mut group) in by_lang {
            group.sort_by_key(|f| std::cmp::Reverse(f.source().len()));
            let max_freq = self.sample_prepass(lang, &group);

            for file in group {
                let explicit = extract_explicit(file, self.catalog);
                let explicit_keys: FastSet<_> = explicit.iter().map(|r| r.region.key()).collect();
                out.extend(explicit);
                out.extend(extract_statistical(file, &self.config, max_freq, &explicit_keys));
            }
        }
        out
    }

    /// Samples the largest files in a language group, and if any node kind
    /// makes up more than `SAMPLE_TRIGGER_FREQ` of its chunk candidates,
    /// tightens the max-frequency threshold for every file in the group
    ///.
    fn sample_prepass(&self, lang: LanguageTag, group: &[&SourceFile]) -> f64 {
        let sample_candidates: Vec<_> = group
            .iter()
            .take(SAMPLE_SIZE)
            .flat_map(|f| candidate_chunks(f.root(), self.config.min_lines))
            .collect();
        if sample_candidates.is_empty() {
            return self.config.max_freq;
        }
        let freq = frequency_table(&sample_candidates);
        let total = sample_candidates.len() as f64;
        let triggered = freq.values().any(|&c| (c as f64 / total) > SAMPLE_TRIGGER_FREQ);
        let max_freq = if triggered { SAMPLE_TIGHTENED_FREQ } else { self.config.max_freq };
        tracing::debug!(%lang, triggered, max_freq, sampled = sample_candidates.len(), "region sample pre-pass");
        max_freq
    }
}

/// Runs every region-extraction rule against one file, reclassifying
/// `Function`-tagged matches into `Function`/`Method`/excluded-nested per
/// its nesting rule.
fn extract_explicit<'tree>(file: &'tree SourceFile, catalog: &RuleCatalog) -> Vec<ExtractedRegion<'tree>> {
    let lang = file.language();
    let profile = region_profile(lang);
    let mut out = Vec::new();

    for rule in catalog.region_rules() {
        if !rule.languages.applies_to(lang) {
            continue;
        }
        let Some(wanted_kind) = rule.params.region_kind else { continue };
        let nodes = RuleEngine::nodes_matching(rule, file.root(), lang, file.source());

        for node in nodes {
            let kind = match wanted_kind {
                RegionKind::Function => match reclassify_function(node, profile) {
                    Some(k) => k,
                    None => continue,
                },
                other => other,
            };
            let (start, end) = node.line_range();
            let region = Region::new(file.path().to_path_buf(), lang, kind, region_name(node), start, end);
            out.push(ExtractedRegion { region, node });
        }
    }
    out
}

/// Walks `node`'s ancestors looking for the nearest function-like or
/// class-like enclosure. A function nested in another function is not a
/// separate region; a function nested in a class is a method.
fn reclassify_function(node: Node<'_>, profile: RegionProfile) -> Option<RegionKind> {
    let mut cur = node.parent();
    while let Some(ancestor) = cur {
        if profile.function_kinds.contains(&ancestor.kind()) {
            return None;
        }
        if profile.class_kinds.contains(&ancestor.kind()) {
            return Some(RegionKind::Method);
        }
        cur = ancestor.parent();
    }
    Some(RegionKind::Function)
}

const NAME_CHILD_KINDS: &[&str] =
    &["identifier", "name", "property_identifier", "simple_identifier", "type_identifier", "constant"];

/// The region's display name: the `name`-field child if the grammar
/// exposes one, else the first identifier-shaped direct child, else
/// `"anonymous"`.
fn region_name(node: Node<'_>) -> String {
    if let Some(named) = node.child_by_field_name("name") {
        return named.text().to_string();
    }
    for child in node.children() {
        if NAME_CHILD_KINDS.contains(&child.kind()) {
            return child.text().to_string();
        }
    }
    "anonymous".to_string()
}

/// Finds chunk-sized spans no explicit rule covers, after applying the
/// frequency/percentile/file-ratio/ignore-types filters and deduplicating
/// against `explicit_keys` (explicit always wins a tie).
fn extract_statistical<'tree>(
    file: &'tree SourceFile,
    config: &RegionConfig,
    max_freq: f64,
    explicit_keys: &FastSet<(PathBuf, usize, usize)>,
) -> Vec<ExtractedRegion<'tree>> {
    let candidates = candidate_chunks(file.root(), config.min_lines);
    let filtered = filter_candidates(candidates, config, max_freq, file.line_count());
    let lang = file.language();

    filtered
        .into_iter()
        .filter_map(|node| {
            let (start, end) = node.line_range();
            let key = (file.path().to_path_buf(), start, end);
            if explicit_keys.contains(&key) {
                return None;
            }
            let region = Region::new(file.path().to_path_buf(), lang, RegionKind::Chunk, region_name(node), start, end);
            Some(ExtractedRegion { region, node })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RuleCatalog {
        RuleCatalog::build().unwrap()
    }

    #[test]
    fn top_level_function_is_a_function_region() {
        let file = SourceFile::parse("t.py", LanguageTag::Python, b"def f():\n    return 1\n").unwrap();
        let extracted = extract_explicit(&file, &catalog());
        assert!(extracted.iter().any(|r| r.region.kind == RegionKind::Function && r.region.name == "f"));
    }

    #[test]
    fn nested_function_is_excluded() {
        let src = b"def outer():\n    def inner():\n        return 1\n    return inner\n";
        let file = SourceFile::parse("t.py", LanguageTag::Python, src).unwrap();
        let extracted = extract_explicit(&file, &catalog());
        let functions: Vec<_> = extracted.iter().filter(|r| r.region.kind == RegionKind::Function).collect();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].region.name, "outer");
    }

    #[test]
    fn method_inside_class_is_reclassified() {
        let src = b"class C:\n    def m(self):\n        return 1\n";
        let file = SourceFile::parse("t.py", LanguageTag::Python, src).unwrap();
        let extracted = extract_explicit(&file, &catalog());
        assert!(extracted.iter().any(|r| r.region.kind == RegionKind::Method && r.region.name == "m"));
        assert!(extracted.iter().any(|r| r.region.kind == RegionKind::Class && r.region.name == "C"));
    }

    #[test]
    fn statistical_chunking_skips_explicit_dedup_keys() {
        let src = b"x = 1\ny = 2\nz = 3\nw = 4\nv = 5\nu = 6\n";
        let file = SourceFile::parse("t.py", LanguageTag::Python, src).unwrap();
        let config = RegionConfig { min_lines: 2, ..RegionConfig::default() };
        let extractor = RegionExtractor::new(&catalog(), config);
        let files = std::slice::from_ref(&file);
        let regions = extractor.extract_all(files);
        // A flat statement list has no explicit region rule match; the
        // whole module body should surface as a statistical chunk.
        assert!(regions.iter().any(|r| r.region.kind == RegionKind::Chunk));
    }
}
