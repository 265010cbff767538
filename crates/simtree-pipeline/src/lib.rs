// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pipeline orchestrator: wires file discovery, parsing, region
//! extraction, shingling, MinHash sketching, LSH grouping, and line
//! reconciliation into a two-pass similarity search.

mod config;
mod discovery;
mod error;
mod metrics;
mod pipeline;

pub use config::Config;
pub use error::PipelineError;
pub use metrics::Metrics;
pub use pipeline::{Pipeline, RegionSignature, SimilarityResult};
