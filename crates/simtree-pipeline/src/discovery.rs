// SPDX-License-Identifier: MIT OR Apache-2.0

//! File discovery: walks a path respecting `.gitignore` and the
//! configured glob overrides, keeping only files in the closed language
//! set ( Non-goals: "file-discovery glob/ignore semantics
//! (delegated to the `ignore` crate)").

use std::path::{Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use simtree_languages::LanguageTag;

use crate::config::Config;

/// Walks `root` (a file or directory), returning every recognized-language
/// file found. A single file path is returned as-is if it matches a known
/// language, regardless of ignore rules.
pub(crate) fn discover_files(root: &Path, config: &Config) -> Vec<(PathBuf, LanguageTag)> {
    if root.is_file() {
        return LanguageTag::from_path(root).map(|lang| vec![(root.to_path_buf(), lang)]).unwrap_or_default();
    }

    let mut override_builder = OverrideBuilder::new(root);
    for pattern in config.ignore_patterns.iter().chain(config.ignore_file_patterns.iter()) {
        if let Err(error) = override_builder.add(&format!("!{pattern}")) {
            tracing::warn!(%pattern, %error, "ignoring malformed glob override");
        }
    }
    let overrides = match override_builder.build() {
        Ok(overrides) => overrides,
        Err(error) => {
            tracing::warn!(%error, "failed to build ignore overrides, walking without them");
            ignore::overrides::Override::empty()
        }
    };

    let mut walker = WalkBuilder::new(root);
    walker.overrides(overrides);

    let mut out = Vec::new();
    for entry in walker.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(%error, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Some(lang) = LanguageTag::from_path(entry.path()) {
            out.push((entry.path().to_path_buf(), lang));
        }
    }
    out
}
