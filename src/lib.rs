//! **refgraph** - Lightweight structural indexing and "who references this" discovery
//!
//! Indexes source files into a hierarchical model (file → functions → classes with
//! methods) and expands a keyword-seeded set into a reverse-reference graph using
//! substring token matching. A heuristic text matcher, not a compiler front end.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core pipeline - structural extraction and reference discovery
pub mod core {
    /// Aggregate data model, qualified node ids, and the document loader
    pub mod model;
    pub use model::{
        AggregateStructure, ClassDef, Edge, FileStructure, FunctionDef, NodeKind, QualifiedId,
        load_aggregate,
    };

    /// Single-file structure extraction (regex declaration scanner)
    pub mod structure;
    pub use structure::{extract_structure, run as structure_run};

    /// Deterministic node flattening and keyword seed matching
    pub mod flatten;
    pub use flatten::{flatten_nodes, seed_matches};

    /// Worklist-driven reference graph builder with pluggable oracle
    pub mod relate;
    pub use relate::{ReferenceOracle, TokenOracle, build_reference_graph, run as relate_run};

    /// Batch driver - subprocess-per-file extraction merged into one document
    pub mod index;
    pub use index::run as index_run;
}

/// Infrastructure - Configuration and encoded I/O
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Encoded reads (UTF-8 with Shift_JIS fallback), atomic encoded writes
    pub mod io;
    pub use io::{DecodeError, decode_with_fallback, encode_output, read_source, write_atomic};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands, OutputEncoding};
pub use core::{index_run, relate_run, structure_run};
pub use infra::{Config, load_config};

// Core types for external consumers
pub use core::{AggregateStructure, Edge, FileStructure, QualifiedId};
