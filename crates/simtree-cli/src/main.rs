// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line entry point for `simtree`.

mod args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use simtree_pipeline::{Config, Pipeline};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(found_any) => {
            if found_any {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Loads config, runs the pipeline over `cli.path`, and prints every
/// similar-region group found. Returns whether any group was found, so
/// `main` can use it as an exit signal (like a linter reporting findings).
fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            Config::from_toml(&text).with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(ruleset) = cli.ruleset {
        config.ruleset = ruleset.into();
    }
    if let Some(min_lines) = cli.min_lines {
        config.min_lines = min_lines;
    }

    let pipeline = Pipeline::new(config).context("building the rule catalog")?;
    let result = pipeline.run(&cli.path);

    for (path, message) in &result.failed_files {
        tracing::warn!(path = %path.display(), %message, "skipped a file");
    }

    let mut found_any = false;
    for group in result.all_groups() {
        found_any = true;
        println!("similarity {:.2}", group.similarity);
        for member in &group.members {
            println!(
                "  {} {}:{}-{} ({})",
                member.name,
                member.path.display(),
                member.start_line,
                member.end_line,
                format!("{:?}", member.kind).to_lowercase(),
            );
        }
    }

    if !found_any {
        println!("no structural duplication found");
    }
    Ok(found_any)
}

fn init_tracing(verbose: u8, quiet: bool) {
    let directive = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
