use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Batch-indexing settings
    pub index: IndexConfig,

    /// Output artifact settings
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig
{
    /// Per-file extractor command (argv prefix; the file path is appended).
    /// Empty means: invoke this binary's own `structure` subcommand.
    pub extractor: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig
{
    /// Default artifact encoding: "utf-8" or "shift-jis"
    pub encoding: String,
}

impl Default for IndexConfig
{
    fn default() -> Self
    {
        Self { extractor: Vec::new() }
    }
}

impl Default for OutputConfig
{
    fn default() -> Self
    {
        Self { encoding: "utf-8".to_string() }
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["refgraph.toml", ".refgraph.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with REFGRAPH_ prefix
    builder = builder.add_source(config::Environment::with_prefix("REFGRAPH").separator("_"));

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("refgraph.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
