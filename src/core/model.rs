//! Aggregate data model: per-file structural models keyed by path, qualified
//! node ids, and reference edges.
//!
//! The aggregate is the sole artifact persisted between indexing and
//! discovery. It is loaded once, never mutated, and read repeatedly by the
//! graph builder. Insertion order is load-bearing everywhere: `IndexMap`
//! keeps the document's key order, which fixes flattening, seeding, and
//! edge-recording order downstream.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::infra::io::read_document;

/// File path → per-file structural model, in document key order.
pub type AggregateStructure = IndexMap<String, FileStructure>;

/// Structural model of one source file.
///
/// `raw` is required in persisted documents; the mappings default to empty
/// when absent so documents from function-only extractors still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStructure {
    /// Full source text of the file
    pub raw: String,

    /// Function name → full matched declaration text
    #[serde(default)]
    pub functions: IndexMap<String, FunctionDef>,

    /// Class name → class model
    #[serde(default)]
    pub classes: IndexMap<String, ClassDef>,
}

/// A named function: its full matched source text, signature and braces included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub body: String,
}

/// Method bodies are shaped exactly like function bodies.
pub type MethodDef = FunctionDef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    /// Representative text fragment used for class-level matching
    pub raw: String,

    /// Instance method name → body
    #[serde(default)]
    pub methods: IndexMap<String, MethodDef>,

    /// Static method name → body
    #[serde(default)]
    pub static_methods: IndexMap<String, MethodDef>,
}

/// Structural kind of a node, carrying the bare name the match oracle tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Function(String),
    Class(String),
    Method(String),
    StaticMethod(String),
}

/// Dotted-segment id naming one structural node.
///
/// The rendered string is the identity: equality and hashing compare it
/// alone, and it is what gets serialized. The kind is constructed alongside
/// the string rather than re-parsed out of it, so the matching rule for a
/// node never depends on string surgery.
#[derive(Debug, Clone)]
pub struct QualifiedId {
    text: String,
    kind: NodeKind,
}

impl QualifiedId {
    pub fn file(path: &str) -> Self {
        Self { text: path.to_string(), kind: NodeKind::File }
    }

    pub fn function(path: &str, name: &str) -> Self {
        Self {
            text: format!("{path}.f-{name}"),
            kind: NodeKind::Function(name.to_string()),
        }
    }

    pub fn class(path: &str, name: &str) -> Self {
        Self {
            text: format!("{path}.c-{name}"),
            kind: NodeKind::Class(name.to_string()),
        }
    }

    pub fn method(path: &str, class: &str, name: &str) -> Self {
        Self {
            text: format!("{path}.c-{class}.m-{name}"),
            kind: NodeKind::Method(name.to_string()),
        }
    }

    pub fn static_method(path: &str, class: &str, name: &str) -> Self {
        Self {
            text: format!("{path}.c-{class}.s-{name}"),
            kind: NodeKind::StaticMethod(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

impl PartialEq for QualifiedId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for QualifiedId {}

impl Hash for QualifiedId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for QualifiedId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// One discovered reference: the referencing node's code contains a token
/// consistent with the referenced node. Serialized as a 2-element array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub referencing: QualifiedId,
    pub referenced: QualifiedId,
}

impl Serialize for Edge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.referencing, &self.referenced).serialize(serializer)
    }
}

/// Load a persisted aggregate document, applying the UTF-8 → Shift_JIS
/// fallback before parsing.
pub fn load_aggregate<P: AsRef<Path>>(path: P) -> Result<AggregateStructure> {
    let path = path.as_ref();
    let text = read_document(path)?;

    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse aggregate structure {}", path.display()))
}
