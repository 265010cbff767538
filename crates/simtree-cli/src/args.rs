// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clap argument definitions for the `simtree` CLI.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use simtree_rules::RuleSet;

/// Top-level CLI options.
#[derive(Parser, Debug)]
#[command(name = "simtree")]
#[command(about = "Finds structurally similar code across a source tree")]
pub struct Cli {
    /// File or directory to scan.
    pub path: PathBuf,

    /// Path to a TOML config file (overridden by any flag given alongside it).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Normalization strength: `none`, `default`, or `loose`.
    #[arg(long, value_enum)]
    pub ruleset: Option<RuleSetArg>,

    /// Minimum line span for a region or matched block to be reported.
    #[arg(long)]
    pub min_lines: Option<usize>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging below warnings.
    #[arg(long)]
    pub quiet: bool,
}

/// Mirrors [`RuleSet`] for clap's `ValueEnum` derive, which can't be
/// implemented on a type this crate doesn't own.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RuleSetArg {
    None,
    Default,
    Loose,
}

impl From<RuleSetArg> for RuleSet {
    fn from(arg: RuleSetArg) -> Self {
        match arg {
            RuleSetArg::None => RuleSet::None,
            RuleSetArg::Default => RuleSet::Default,
            RuleSetArg::Loose => RuleSet::Loose,
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}
