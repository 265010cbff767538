// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level orchestration errors ("Rule engine construction
//! errors — fatal to the whole run"). Everything else is surfaced as data
//! in `SimilarityResult::failed_files`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to build the rule catalog")]
    RuleCatalog(#[from] simtree_rules::RuleError),
}
