//! Deterministic node flattening and keyword seed matching.
//!
//! Both walks visit the aggregate in the same fixed order: per file, the
//! file node first, then functions, then each class followed by its methods
//! and static methods, each in the map's own key order. That order is the
//! tie-breaker for edge recording, so it is a contract, not an artifact.

use memchr::memmem;

use crate::core::model::{AggregateStructure, QualifiedId};

/// Lazily yield every structural node as a (qualified id, code text) pair.
///
/// Restartable: the graph builder re-runs this once per expanded node.
pub fn flatten_nodes(
    aggregate: &AggregateStructure,
) -> impl Iterator<Item = (QualifiedId, &str)> {
    aggregate.iter().flat_map(|(path, file)| {
        let file_node = std::iter::once((QualifiedId::file(path), file.raw.as_str()));

        let functions = file
            .functions
            .iter()
            .map(move |(name, def)| (QualifiedId::function(path, name), def.body.as_str()));

        let classes = file.classes.iter().flat_map(move |(class_name, class)| {
            let class_node =
                std::iter::once((QualifiedId::class(path, class_name), class.raw.as_str()));

            let methods = class.methods.iter().map(move |(name, def)| {
                (QualifiedId::method(path, class_name, name), def.body.as_str())
            });

            let statics = class.static_methods.iter().map(move |(name, def)| {
                (
                    QualifiedId::static_method(path, class_name, name),
                    def.body.as_str(),
                )
            });

            class_node.chain(methods).chain(statics)
        });

        file_node.chain(functions).chain(classes)
    })
}

/// Substring containment over raw bytes.
fn contains(haystack: &str, needle: &str) -> bool {
    memmem::find(haystack.as_bytes(), needle.as_bytes()).is_some()
}

/// Collect the initial worklist for a keyword, in discovery order.
///
/// A file node qualifies when its *raw text* contains the keyword; every
/// named node qualifies when its *name* does. Bodies are never tested here -
/// body containment only matters during expansion.
pub fn seed_matches(aggregate: &AggregateStructure, keyword: &str) -> Vec<QualifiedId> {
    let mut seeds = Vec::new();

    for (path, file) in aggregate {
        if contains(&file.raw, keyword) {
            seeds.push(QualifiedId::file(path));
        }

        for name in file.functions.keys() {
            if contains(name, keyword) {
                seeds.push(QualifiedId::function(path, name));
            }
        }

        for (class_name, class) in &file.classes {
            if contains(class_name, keyword) {
                seeds.push(QualifiedId::class(path, class_name));
            }

            for name in class.methods.keys() {
                if contains(name, keyword) {
                    seeds.push(QualifiedId::method(path, class_name, name));
                }
            }

            for name in class.static_methods.keys() {
                if contains(name, keyword) {
                    seeds.push(QualifiedId::static_method(path, class_name, name));
                }
            }
        }
    }

    seeds
}
