//! Reference graph discovery.
//!
//! Starting from the keyword seeds, a worklist expands to the transitive
//! closure of referencing elements. The worklist is an explicit LIFO stack:
//! push on top, pop from top. That discipline is a contract - it fixes the
//! edge output order together with the flattener's traversal order.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use memchr::memmem;
use owo_colors::OwoColorize;
use petgraph::dot::{Config as DotConfig, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::cli::{AppContext, RelateArgs};
use crate::core::flatten::{flatten_nodes, seed_matches};
use crate::core::model::{AggregateStructure, Edge, NodeKind, QualifiedId, load_aggregate};
use crate::infra::io::{to_pretty_json, write_output};

/// Decides whether a code fragment textually references a named node.
///
/// The traversal never looks at node kinds itself, so an AST-backed oracle
/// can replace the token heuristic without touching the algorithm.
pub trait ReferenceOracle {
    fn references(&self, candidate_text: &str, target: &QualifiedId) -> bool;
}

/// Default substring heuristic: `name(` for callables, `name ` for classes.
///
/// Method names are matched codebase-wide; the owning class is deliberately
/// not part of the test. Bare file ids never match as targets.
pub struct TokenOracle;

impl TokenOracle {
    fn contains_token(text: &str, name: &str, suffix: u8) -> bool {
        let mut needle = Vec::with_capacity(name.len() + 1);
        needle.extend_from_slice(name.as_bytes());
        needle.push(suffix);
        memmem::find(text.as_bytes(), &needle).is_some()
    }
}

impl ReferenceOracle for TokenOracle {
    fn references(&self, candidate_text: &str, target: &QualifiedId) -> bool {
        match target.kind() {
            NodeKind::File => false,
            NodeKind::Function(name)
            | NodeKind::Method(name)
            | NodeKind::StaticMethod(name) => Self::contains_token(candidate_text, name, b'('),
            NodeKind::Class(name) => Self::contains_token(candidate_text, name, b' '),
        }
    }
}

/// Expand the seed set to the full reference graph.
///
/// Pops one id at a time (LIFO); already-visited ids are silent no-ops. For
/// every flattened node whose text satisfies the oracle against the popped
/// id, an edge (referencing → referenced) is appended and the referencing id
/// is pushed for its own expansion. An id is marked visited only after the
/// whole flattened sequence has been scanned for it.
///
/// Terminates because `visited` only grows over a finite node universe;
/// edges may repeat across rounds and are kept, not deduplicated.
pub fn build_reference_graph(
    aggregate: &AggregateStructure,
    seeds: Vec<QualifiedId>,
    oracle: &dyn ReferenceOracle,
) -> Vec<Edge> {
    let mut stack = seeds;
    let mut visited: HashSet<QualifiedId> = HashSet::new();
    let mut edges = Vec::new();

    while let Some(target) = stack.pop() {
        if visited.contains(&target) {
            continue;
        }

        debug!(node = %target, pending = stack.len(), "expanding node");

        for (candidate, text) in flatten_nodes(aggregate) {
            if oracle.references(text, &target) {
                stack.push(candidate.clone());
                edges.push(Edge { referencing: candidate, referenced: target.clone() });
            }
        }

        visited.insert(target);
    }

    debug!(edges = edges.len(), visited = visited.len(), "traversal complete");
    edges
}

/// Render the discovered edges as a Graphviz digraph.
fn render_dot(edges: &[Edge]) -> String {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: IndexMap<&str, NodeIndex> = IndexMap::new();

    for edge in edges {
        let from = *nodes
            .entry(edge.referencing.as_str())
            .or_insert_with(|| graph.add_node(edge.referencing.to_string()));
        let to = *nodes
            .entry(edge.referenced.as_str())
            .or_insert_with(|| graph.add_node(edge.referenced.to_string()));
        graph.add_edge(from, to, ());
    }

    format!("{:?}", Dot::with_config(&graph, &[DotConfig::EdgeNoLabel]))
}

/// `rgr relate <input> <keyword> <output>`: load the aggregate, seed from
/// the keyword, build the edge list, and persist it as a pretty JSON array.
pub fn run(args: RelateArgs, ctx: &AppContext) -> Result<()> {
    let aggregate = load_aggregate(&args.input)?;

    let seeds = seed_matches(&aggregate, &args.keyword);
    debug!(seeds = seeds.len(), keyword = %args.keyword, "seed matching complete");

    let edges = build_reference_graph(&aggregate, seeds, &TokenOracle);

    let json = to_pretty_json(&edges)?;
    write_output(&args.output, &json, ctx.output_encoding)
        .with_context(|| format!("Failed to write edges to {}", args.output.display()))?;

    if let Some(dot_path) = &args.dot {
        write_output(dot_path, &render_dot(&edges), ctx.output_encoding)
            .with_context(|| format!("Failed to write DOT graph to {}", dot_path.display()))?;
    }

    if !ctx.quiet {
        print_summary(&edges, &args.output, ctx.no_color);
    }

    Ok(())
}

fn print_summary(edges: &[Edge], output: &Path, no_color: bool) {
    if no_color {
        println!("✓ Found {} reference edges, written to {}", edges.len(), output.display());
    } else {
        println!(
            "{} Found {} reference edges, written to {}",
            "✓".green(),
            edges.len(),
            output.display()
        );
    }
}
