//! Single-file structure extraction.
//!
//! Scans one file's text for named function declarations with a non-greedy,
//! line-anchored regex and records each match verbatim. This is a textual
//! scanner, not a parser: nested declarations are consumed inside the
//! enclosing match, and a nested closing brace that ends a line terminates
//! the outer match early. Class and method extraction is presently inert;
//! downstream stages honor classes only when a document supplies them.

use std::io::Write;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;

use crate::cli::{AppContext, StructureArgs};
use crate::core::model::{FileStructure, FunctionDef};
use crate::infra::io::{encode_output, read_source, to_pretty_json};

/// Matches `function name(params) { body }` where the closing brace ends a
/// line. Non-greedy body, dot matches newlines.
fn function_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?ms)function\s+(\w+)\s*\((.*?)\)\s*\{(.*?)\}$")
            .expect("function pattern is valid")
    })
}

/// Extract the structural model of one file's text.
///
/// Duplicate names overwrite earlier bodies while keeping the original key
/// position (standard insertion-order-map semantics).
pub fn extract_structure(content: &str) -> FileStructure {
    let mut functions = IndexMap::new();

    for caps in function_pattern().captures_iter(content) {
        let name = caps[1].to_string();
        let body = caps[0].to_string();
        functions.insert(name, FunctionDef { body });
    }

    FileStructure {
        raw: content.to_string(),
        functions,
        classes: IndexMap::new(),
    }
}

/// `rgr structure <file>`: print the flat function-name → matched-text map
/// to stdout. This is the subprocess contract the batch driver consumes.
pub fn run(args: StructureArgs, ctx: &AppContext) -> Result<()> {
    let content = read_source(&args.file)
        .with_context(|| format!("Failed to read source file {}", args.file.display()))?;

    let structure = extract_structure(&content);

    // Flat name → body map, not the full FileStructure
    let flat: IndexMap<&str, &str> = structure
        .functions
        .iter()
        .map(|(name, def)| (name.as_str(), def.body.as_str()))
        .collect();

    let json = to_pretty_json(&flat)?;
    let bytes = encode_output(&json, ctx.output_encoding);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes).context("Failed to write to stdout")?;
    stdout.write_all(b"\n").context("Failed to write to stdout")?;

    Ok(())
}
