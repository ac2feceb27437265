use anyhow::Result;
use clap::Parser;
use refgraph::cli::{AppContext, Cli, Commands, OutputEncoding};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Skip diagnostics go to stderr at WARN by default; RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = refgraph::load_config().unwrap_or_default();

    // CLI flag wins; config supplies the default encoding
    let output_encoding = match cli.output_encoding {
        Some(enc) => enc,
        None => config
            .output
            .encoding
            .parse()
            .unwrap_or(OutputEncoding::Utf8),
    };

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        output_encoding,
    };

    match cli.command {
        Commands::Structure(args) => refgraph::structure_run(args, &ctx),
        Commands::Index(args) => refgraph::index_run(args, &ctx),
        Commands::Relate(args) => refgraph::relate_run(args, &ctx),
        Commands::Init(args) => refgraph::infra::config::init(args, &ctx),
        Commands::Completions(args) => refgraph::completion::run(args),
    }
}
