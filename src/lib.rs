// SPDX-License-Identifier: MIT OR Apache-2.0

//! simtree - structural code-duplication detector.
//!
//! This is the top-level library crate. It re-exports the public surface
//! of the component crates in the workspace; the actual pipeline stages
//! live in `simtree-ast`, `simtree-rules`, `simtree-regions`,
//! `simtree-shingle`, `simtree-minhash`, `simtree-lsh`, `simtree-windows`
//! and `simtree-pipeline`.

pub use simtree_ast as ast;
pub use simtree_languages as languages;
pub use simtree_lsh as lsh;
pub use simtree_minhash as minhash;
pub use simtree_pipeline as pipeline;
pub use simtree_regions as regions;
pub use simtree_rules as rules;
pub use simtree_shingle as shingle;
pub use simtree_windows as windows;

pub use simtree_pipeline::{Config, Pipeline, SimilarityResult};
pub use simtree_rules::RuleSet;

/// Crate version, re-exported for CLI `--version` output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
