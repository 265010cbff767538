// SPDX-License-Identifier: MIT OR Apache-2.0

//! The k-gram shingler: walks a rule-normalized AST and emits structural
//! k-grams over each node's `(name, value)` representation.

mod repr;
mod shingler;

pub use repr::SEPARATOR;
pub use shingler::{Shingle, ShingleConfig, Shingler};
