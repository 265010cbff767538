// SPDX-License-Identifier: MIT OR Apache-2.0

//! The two-pass orchestrator: parse every discovered file, find similar
//! regions, then find similar unstructured line ranges in whatever each
//! file's region pass left uncovered.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use simtree_ast::SourceFile;
use simtree_lsh::{group, LshParams, RegionEntry, SimilarRegionGroup};
use simtree_minhash::{MinHashConfig, MinHasher};
use simtree_regions::{ExtractedRegion, Region, RegionConfig, RegionExtractor};
use simtree_rules::{RegionKind, RuleCatalog, RuleEngine};
use simtree_shingle::{ShingleConfig, Shingler};
use simtree_utils::FastMap;
use simtree_windows::{make_windows, matched_lines, merge_window_groups, unmatched_ranges, WindowConfig};

use crate::config::Config;
use crate::discovery::discover_files;
use crate::error::PipelineError;
use crate::metrics::Metrics;

/// A region's shingle count, carried alongside the grouping result so
/// callers can tell a thin chunk from a thick one without re-shingling.
#[derive(Debug, Clone)]
pub struct RegionSignature {
    pub region: Region,
    pub shingle_count: usize,
}

/// Everything one pipeline run produces ("regions considered,
/// the similar-region groups found in the region pass, and the
/// similar-line groups found in the line pass").
#[derive(Debug, Clone, Default)]
pub struct SimilarityResult {
    pub signatures: Vec<RegionSignature>,
    pub region_groups: Vec<SimilarRegionGroup>,
    pub line_groups: Vec<SimilarRegionGroup>,
    pub failed_files: FastMap<PathBuf, String>,
    /// Populated only when `Config::collect_metrics` is set.
    pub metrics: Option<Metrics>,
}

impl SimilarityResult {
    /// All similar-region groups from both passes, region groups first.
    #[must_use]
    pub fn all_groups(&self) -> impl Iterator<Item = &SimilarRegionGroup> {
        self.region_groups.iter().chain(self.line_groups.iter())
    }
}

/// Owns the compiled rule catalog (built once, fatal to
/// construct) and runs the two-pass algorithm over a path.
pub struct Pipeline {
    catalog: RuleCatalog,
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self, PipelineError> {
        let catalog = RuleCatalog::build()?;
        Ok(Self { catalog, config })
    }

    /// Discovers files under `root`, parses them in parallel, and runs the
    /// region pass followed by the line pass.
    #[must_use]
    pub fn run(&self, root: &Path) -> SimilarityResult {
        let discovered = discover_files(root, &self.config);
        let (files, mut failed_files) = self.parse_all(discovered);
        let mut metrics = Metrics::default();
        metrics.files_parsed = files.len();
        metrics.files_failed = failed_files.len();

        let line_counts: FastMap<PathBuf, usize> =
            files.iter().map(|f| (f.path().to_path_buf(), f.line_count())).collect();

        let (signatures, region_groups) = self.region_pass(&files, &line_counts, &mut metrics);
        let matched = matched_lines(&region_groups);
        let line_groups = self.line_pass(&files, &matched, &mut metrics);

        failed_files.shrink_to_fit();
        let metrics = if self.config.collect_metrics {
            tracing::info!(?metrics, "pipeline run complete");
            Some(metrics)
        } else {
            None
        };
        SimilarityResult { signatures, region_groups, line_groups, failed_files, metrics }
    }

    fn parse_all(&self, discovered: Vec<(PathBuf, simtree_languages::LanguageTag)>) -> (Vec<SourceFile>, FastMap<PathBuf, String>) {
        let parsed: Vec<Result<SourceFile, (PathBuf, String)>> = discovered
            .into_par_iter()
            .map(|(path, lang)| match std::fs::read(&path) {
                Ok(bytes) => SourceFile::parse(path.clone(), lang, &bytes).map_err(|e| (path, e.to_string())),
                Err(e) => Err((path, e.to_string())),
            })
            .collect();

        let mut files = Vec::new();
        let mut failed = FastMap::default();
        for result in parsed {
            match result {
                Ok(file) => files.push(file),
                Err((path, message)) => {
                    tracing::warn!(path = %path.display(), %message, "failed to parse file");
                    failed.insert(path, message);
                }
            }
        }
        (files, failed)
    }

    /// Extracts regions, drops whole-file regions,
    /// shingles and sketches each, then groups by similarity.
    fn region_pass(
        &self,
        files: &[SourceFile],
        line_counts: &FastMap<PathBuf, usize>,
        metrics: &mut Metrics,
    ) -> (Vec<RegionSignature>, Vec<SimilarRegionGroup>) {
        let region_config = RegionConfig {
            min_lines: self.config.min_lines,
            max_freq: self.config.max_freq,
            percentile: self.config.percentile,
            max_file_ratio: self.config.max_file_ratio,
            ignore_types: self.config.ignore_types.iter().cloned().collect(),
        };
        let extractor = RegionExtractor::new(&self.catalog, region_config);
        let extracted = extractor.extract_all(files);

        let mut by_path: FastMap<PathBuf, Vec<ExtractedRegion<'_>>> = FastMap::default();
        for er in extracted {
            let whole_file = line_counts.get(&er.region.path).is_some_and(|&n| er.region.start_line == 1 && er.region.end_line == n);
            if whole_file {
                continue;
            }
            by_path.entry(er.region.path.clone()).or_default().push(er);
        }

        let shingler = Shingler::new(ShingleConfig { k: self.config.shingle_k, value_limit: self.config.value_limit });
        let hasher = MinHasher::new(MinHashConfig { num_permutations: self.config.minhash_num_perm });
        let mut engine = RuleEngine::new(&self.catalog, self.config.ruleset);

        let mut entries = Vec::new();
        for file in files {
            let Some(regions) = by_path.remove(file.path()) else { continue };
            engine.precompute_queries(file.root(), file.language(), file.source());
            for er in regions {
                let shingles = shingler.shingle_node(er.node, &mut engine);
                let sequence: Vec<String> = shingles.into_iter().map(|s| s.content).collect();
                let signature = hasher.sketch(sequence.iter().map(String::as_str));
                entries.push(RegionEntry { region: er.region, signature, shingle_sequence: sequence });
            }
        }

        metrics.regions_extracted = entries.len();
        let signatures: Vec<RegionSignature> =
            entries.iter().map(|e| RegionSignature { region: e.region.clone(), shingle_count: e.shingle_sequence.len() }).collect();

        let params = LshParams {
            bands: self.config.minhash_num_perm / 4,
            rows_per_band: 4,
            threshold: self.config.region_threshold,
            min_similarity: self.config.region_min_similarity,
            verify: self.config.verify,
        };
        let groups: Vec<_> =
            group(&entries, &params).into_iter().filter(|g| g.members.iter().all(|m| m.line_count() >= self.config.min_lines)).collect();
        metrics.region_groups = groups.len();
        (signatures, groups)
    }

    /// Windows every file's region-pass-unmatched lines, shingles and
    /// sketches each window, groups by similarity, then merges
    /// neighbouring windows in a group back into contiguous `lines`
    /// regions.
    fn line_pass(
        &self,
        files: &[SourceFile],
        matched: &FastMap<PathBuf, Vec<(usize, usize)>>,
        metrics: &mut Metrics,
    ) -> Vec<SimilarRegionGroup> {
        let shingler = Shingler::new(ShingleConfig { k: self.config.shingle_k, value_limit: self.config.value_limit });
        let hasher = MinHasher::new(MinHashConfig { num_permutations: self.config.minhash_num_perm });
        let mut engine = RuleEngine::new(&self.catalog, self.config.ruleset);
        let window_config = WindowConfig {
            window_size: self.config.window_size,
            stride: self.config.stride,
            min_shingles: (self.config.min_lines / self.config.shingle_k.max(1)).max(1),
        };

        let mut entries = Vec::new();
        for file in files {
            let empty = Vec::new();
            let file_matched = matched.get(file.path()).unwrap_or(&empty);
            let ranges = unmatched_ranges(file.line_count(), file_matched, self.config.min_lines);
            if ranges.is_empty() {
                continue;
            }
            engine.precompute_queries(file.root(), file.language(), file.source());

            for range in ranges {
                let shingles = shingler.shingle_window(file.root(), range, &mut engine);
                let windows = make_windows(&shingles, window_config);
                metrics.windows_produced += windows.len();
                for window in windows {
                    let signature = hasher.sketch(window.contents.iter().map(String::as_str));
                    let region = Region::new(
                        file.path().to_path_buf(),
                        file.language(),
                        RegionKind::ShingleWindow,
                        "window",
                        window.start_line,
                        window.end_line,
                    );
                    entries.push(RegionEntry { region, signature, shingle_sequence: window.contents });
                }
            }
        }

        let params = LshParams {
            bands: self.config.minhash_num_perm / 4,
            rows_per_band: 4,
            threshold: self.config.line_threshold,
            min_similarity: self.config.line_min_similarity,
            verify: self.config.verify,
        };
        let groups = group(&entries, &params);
        let merged = merge_window_groups(groups, self.config.merge_gap);
        let merged: Vec<_> = merged.into_iter().filter(|g| g.members.iter().all(|m| m.line_count() >= self.config.min_lines)).collect();
        metrics.line_groups = merged.len();
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn identical_functions_in_one_file_are_grouped() {
        let dir = tempdir();
        write_file(
            dir.path(),
            "t.py",
            "def f(a):\n    total = a + 1\n    total = total * 2\n    return total\n\n\
             def g(b):\n    total = b + 1\n    total = total * 2\n    return total\n",
        );
        let config = Config { min_lines: 2, ..Config::default() };
        let pipeline = Pipeline::new(config).unwrap();
        let result = pipeline.run(dir.path());
        assert!(result.region_groups.iter().any(|g| g.members.len() == 2));
    }

    #[test]
    fn renamed_and_reformatted_cross_file_duplicate_is_found() {
        let dir = tempdir();
        write_file(dir.path(), "a.py", "def compute(x):\n    y = x + 1\n    y = y * 2\n    return y\n");
        write_file(dir.path(), "b.py", "def calculate(value):\n    result = value + 1\n    result = result * 2\n    return result\n");
        let config = Config { min_lines: 2, ..Config::default() };
        let pipeline = Pipeline::new(config).unwrap();
        let result = pipeline.run(dir.path());
        assert!(result.region_groups.iter().any(|g| g.members.len() == 2));
    }

    #[test]
    fn small_regions_below_min_lines_are_not_matched() {
        let dir = tempdir();
        write_file(dir.path(), "a.py", "def f():\n    return 1\n");
        write_file(dir.path(), "b.py", "def g():\n    return 1\n");
        let config = Config { min_lines: 50, ..Config::default() };
        let pipeline = Pipeline::new(config).unwrap();
        let result = pipeline.run(dir.path());
        assert!(result.region_groups.is_empty());
    }

    #[test]
    fn metrics_are_returned_only_when_requested() {
        let dir = tempdir();
        write_file(dir.path(), "a.py", "def f():\n    return 1\n");

        let quiet = Pipeline::new(Config::default()).unwrap();
        assert!(quiet.run(dir.path()).metrics.is_none());

        let config = Config { collect_metrics: true, ..Config::default() };
        let loud = Pipeline::new(config).unwrap();
        let result = loud.run(dir.path());
        let metrics = result.metrics.expect("collect_metrics requested metrics to be returned");
        assert_eq!(metrics.files_parsed, 1);
    }

    #[test]
    fn small_duplicate_function_is_not_matched_even_when_not_whole_file() {
        let dir = tempdir();
        write_file(dir.path(), "a.py", "def f():\n    return 1\n\ndef unrelated():\n    pass\n");
        write_file(dir.path(), "b.py", "def g():\n    return 1\n\ndef other():\n    pass\n");
        let config = Config { min_lines: 5, ..Config::default() };
        let pipeline = Pipeline::new(config).unwrap();
        let result = pipeline.run(dir.path());
        assert!(result.region_groups.is_empty(), "1-line functions must not group when min_lines=5");
    }

    #[test]
    fn unparseable_files_are_reported_not_fatal() {
        let dir = tempdir();
        write_file(dir.path(), "ok.py", "def f():\n    return 1\n");
        let pipeline = Pipeline::new(Config::default()).unwrap();
        let result = pipeline.run(dir.path());
        assert!(result.failed_files.is_empty());
    }

    /// Minimal `tempdir` helper: a process-unique directory under
    /// `std::env::temp_dir()`, cleaned up on drop.
    struct TempDir(PathBuf);
    impl TempDir {
        fn path(&self) -> &Path {
            &self.0
        }
    }
    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }
    fn tempdir() -> TempDir {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("simtree-pipeline-test-{}-{n}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        TempDir(path)
    }
}
