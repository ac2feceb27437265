use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,                     // global --quiet
    pub no_color: bool,                  // global --no-color
    pub output_encoding: OutputEncoding, // global --output-encoding (config fallback)
}

#[derive(Parser)]
#[command(name = "refgraph")]
#[command(
    about = "A lightweight CLI that indexes source files into a structural model and discovers who references what"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Text encoding for written artifacts (defaults from refgraph.toml)
    #[arg(long, global = true, value_enum)]
    pub output_encoding: Option<OutputEncoding>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the structural model of a single source file
    Structure(StructureArgs),

    /// Index many files into one aggregate structure document
    Index(IndexArgs),

    /// Discover which elements reference a keyword-seeded set
    Relate(RelateArgs),

    /// Initialize a refgraph.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser)]
pub struct StructureArgs {
    /// Source file to extract function declarations from
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct IndexArgs {
    /// Whitespace-separated list of file paths (one shell argument)
    pub files: String,

    /// Output path for the aggregate structure JSON
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct RelateArgs {
    /// Aggregate structure JSON produced by `rgr index`
    pub input: PathBuf,

    /// Seed keyword to search names and file text for
    pub keyword: String,

    /// Output path for the reference-edge JSON array
    pub output: PathBuf,

    /// Additionally render the discovered graph as Graphviz DOT
    #[arg(long)]
    pub dot: Option<PathBuf>,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}

/// Encoding applied to every artifact this tool writes (files and stdout).
/// Mirrors the read-side pair: UTF-8 primary, Shift_JIS legacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputEncoding {
    /// UTF-8 (default)
    #[value(name = "utf-8")]
    Utf8,

    /// Shift_JIS legacy encoding
    #[value(name = "shift-jis")]
    ShiftJis,
}

impl FromStr for OutputEncoding {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(OutputEncoding::Utf8),
            "shift-jis" | "shift_jis" | "sjis" => Ok(OutputEncoding::ShiftJis),
            other => anyhow::bail!("unknown output encoding: {other}"),
        }
    }
}
