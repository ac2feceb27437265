//! Batch driver: run the per-file extractor as an isolated subprocess for
//! every listed path and merge the results into one aggregate document.
//!
//! Extraction is embarrassingly parallel; results are collected in input
//! order so the aggregate's key order (and all downstream ordering) matches
//! the input list. Every per-file failure is a warn-and-skip, never an
//! abort; partial results are always written.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

use crate::cli::{AppContext, IndexArgs};
use crate::core::model::{AggregateStructure, FileStructure, FunctionDef};
use crate::infra::config::load_config;
use crate::infra::io::{read_source, to_pretty_json, write_output};

/// Why one listed file was left out of the aggregate.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("does not exist or is not a file")]
    MissingFile,

    #[error("extractor failed: {0}")]
    ExtractorFailed(String),

    #[error("extractor produced malformed JSON: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}

/// Resolve the extractor argv: the configured override, or this binary's
/// own `structure` subcommand.
fn extractor_argv(configured: &[String]) -> Result<Vec<String>> {
    if !configured.is_empty() {
        return Ok(configured.to_vec());
    }

    let exe = std::env::current_exe().context("Failed to locate own executable")?;
    Ok(vec![exe.display().to_string(), "structure".to_string()])
}

/// Extract one file via subprocess and lift the flat name → text map into a
/// conforming per-file model (`raw` read by the driver, classes empty).
fn index_one(path: &str, argv: &[String]) -> Result<FileStructure, SkipReason> {
    if !Path::new(path).is_file() {
        return Err(SkipReason::MissingFile);
    }

    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .arg(path)
        .output()
        .map_err(|e| SkipReason::ExtractorFailed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SkipReason::ExtractorFailed(format!(
            "{} ({})",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let functions: IndexMap<String, String> = serde_json::from_str(&stdout)?;

    let raw = read_source(path).map_err(|e| SkipReason::ExtractorFailed(e.to_string()))?;

    Ok(FileStructure {
        raw,
        functions: functions
            .into_iter()
            .map(|(name, body)| (name, FunctionDef { body }))
            .collect(),
        classes: IndexMap::new(),
    })
}

/// `rgr index <file-list> <output>`: extract every listed file and persist
/// the merged aggregate structure.
pub fn run(args: IndexArgs, ctx: &AppContext) -> Result<()> {
    let config = load_config().unwrap_or_default();
    let argv = extractor_argv(&config.index.extractor)?;

    let paths: Vec<&str> = args.files.split_whitespace().collect();
    if paths.is_empty() {
        anyhow::bail!("No input files specified");
    }

    // Set up progress bar (unless quiet mode)
    let progress = if ctx.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(paths.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    };

    // Fan out one subprocess per file; collect preserves input order
    let results: Vec<(&str, Result<FileStructure, SkipReason>)> = paths
        .par_iter()
        .map(|path| {
            let result = index_one(path, &argv);
            progress.inc(1);
            progress.set_message(format!("Indexed {path}"));
            (*path, result)
        })
        .collect();

    progress.finish_with_message("Indexing complete");

    // Merge sequentially so skip diagnostics come out in input order
    let mut aggregate = AggregateStructure::new();
    let mut skipped = 0usize;

    for (path, result) in results {
        match result {
            Ok(structure) => {
                aggregate.insert(path.to_string(), structure);
            }
            Err(reason) => {
                warn!(path, %reason, "skipping file");
                skipped += 1;
            }
        }
    }

    let json = to_pretty_json(&aggregate)?;
    write_output(&args.output, &json, ctx.output_encoding)
        .with_context(|| format!("Failed to write aggregate to {}", args.output.display()))?;

    if !ctx.quiet {
        let summary = format!(
            "Indexed {} files to {} ({} skipped)",
            aggregate.len(),
            args.output.display(),
            skipped
        );
        if ctx.no_color {
            println!("✓ {summary}");
        } else {
            println!("{} {summary}", "✓".green());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_extractor_wins_over_own_binary() {
        let argv =
            extractor_argv(&["python".to_string(), "extract.py".to_string()]).unwrap();
        assert_eq!(argv, vec!["python", "extract.py"]);
    }

    #[test]
    fn empty_override_resolves_to_own_structure_subcommand() {
        let argv = extractor_argv(&[]).unwrap();
        assert_eq!(argv.len(), 2);
        assert_eq!(argv[1], "structure");
    }

    #[test]
    fn missing_file_is_reported_as_such() {
        let argv = vec!["true".to_string()];
        let err = index_one("definitely/not/a/file.js", &argv).unwrap_err();
        assert!(matches!(err, SkipReason::MissingFile));
    }

    #[cfg(unix)]
    #[test]
    fn malformed_extractor_output_is_reported() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let file = tmp.path().join("a.js");
        std::fs::write(&file, "function a() {}\n")?;

        // `echo` prints the path back, which is not valid JSON
        let argv = vec!["echo".to_string()];
        let err = index_one(&file.display().to_string(), &argv).unwrap_err();
        assert!(matches!(err, SkipReason::MalformedOutput(_)));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn failing_extractor_is_reported() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let file = tmp.path().join("a.js");
        std::fs::write(&file, "function a() {}\n")?;

        let argv = vec!["false".to_string()];
        let err = index_one(&file.display().to_string(), &argv).unwrap_err();
        assert!(matches!(err, SkipReason::ExtractorFailed(_)));
        Ok(())
    }
}
