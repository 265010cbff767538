// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios run through the public `Pipeline` API against
//! real files on disk.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use simtree_pipeline::{Config, Pipeline};

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
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("simtree-pipeline-it-{}-{n}", std::process::id()));
    std::fs::create_dir_all(&path).unwrap();
    TempDir(path)
}
fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn class_with_one_rewritten_method_still_matches_the_unchanged_one() {
    let dir = tempdir();
    write_file(
        dir.path(),
        "a.py",
        "class Widget:\n\
         \x20   def area(self, w, h):\n\
         \x20       total = w * h\n\
         \x20       total = total + 1\n\
         \x20       return total\n\
         \x20   def describe(self):\n\
         \x20       return 'a widget'\n",
    );
    write_file(
        dir.path(),
        "b.py",
        "class Shape:\n\
         \x20   def area(self, width, height):\n\
         \x20       total = width * height\n\
         \x20       total = total + 1\n\
         \x20       return total\n\
         \x20   def describe(self):\n\
         \x20       return 'a completely different description entirely here'\n",
    );
    let config = Config { min_lines: 2, ..Config::default() };
    let pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.run(dir.path());

    let matched_names: Vec<_> = result
        .region_groups
        .iter()
        .flat_map(|g| g.members.iter())
        .map(|r| r.name.clone())
        .collect();
    assert!(matched_names.iter().any(|n| n == "area"));
}

#[test]
fn duplicate_unstructured_blocks_are_found_by_the_line_pass() {
    let dir = tempdir();
    let block = "a = 1\nb = 2\nc = a + b\nd = c * 2\ne = d - 1\nf = e + a\ng = f * b\nh = g - c\n";
    write_file(dir.path(), "a.py", &format!("x = 0\n{block}"));
    write_file(dir.path(), "b.py", &format!("y = 0\n{block}"));
    let config = Config { min_lines: 5, window_size: 8, stride: 2, ..Config::default() };
    let pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.run(dir.path());
    assert!(!result.line_groups.is_empty(), "expected the identical trailing block to surface as a line-pass group");
}

#[test]
fn differing_docstrings_alone_do_not_create_a_false_match_with_unrelated_code() {
    let dir = tempdir();
    write_file(
        dir.path(),
        "a.py",
        "def f(x):\n    \"\"\"Adds one to x.\"\"\"\n    return x + 1\n",
    );
    write_file(
        dir.path(),
        "b.py",
        "def g(y):\n    \"\"\"Computes the factorial of y recursively, raising on negative input.\"\"\"\n    if y <= 1:\n        return 1\n    return y * g(y - 1)\n",
    );
    let config = Config { min_lines: 1, ..Config::default() };
    let pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.run(dir.path());
    assert!(result.region_groups.is_empty(), "structurally different functions must not match just because both have docstrings");
}
