//! Relationship Graph
//!
//! Append-only store of `(subject, relation, object)` facts. Facts are kept in
//! insertion order (the class generator depends on it) with a hash set for
//! idempotent insertion, and every entity-to-entity fact is mirrored as an edge
//! in a petgraph `DiGraph` for traversal (subclass closure, cycle checks, DOT).
//!
//! All identifiers share one flat namespace. Each identifier remembers which
//! [`EntityKind`]s it was declared as, and incompatible roles are reported as
//! [`DiagnosticCode::NameCollision`] instead of being merged silently.

pub mod diagnostics;
pub mod loader;
pub mod query;

pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use loader::populate;
pub use query::Pattern;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Role an identifier plays in the taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Class loaded from the schema (or a stub for an undeclared superkind)
    Kind,
    /// Marker tag
    Tag,
    /// Named bundle of tags
    Trait,
    /// Class synthesized by the generator
    GeneratedClass,
}

impl EntityKind {
    /// Whether one identifier may legitimately play both roles.
    ///
    /// Traits are kinds in Haystack definitions, so Kind and Trait coexist.
    pub fn compatible_with(self, other: EntityKind) -> bool {
        use EntityKind::*;
        self == other || matches!((self, other), (Kind, Trait) | (Trait, Kind))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kind => "kind",
            Self::Tag => "tag",
            Self::Trait => "trait",
            Self::GeneratedClass => "generated-class",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relation {
    SubclassOf,
    HasTag,
    HasTrait,
    HasDefinition,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubclassOf => "subclass-of",
            Self::HasTag => "has-tag",
            Self::HasTrait => "has-trait",
            Self::HasDefinition => "has-definition",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object position of a fact
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Term {
    /// Named entity in the flat namespace
    Entity(String),
    /// Literal text (definitions)
    Literal(String),
}

impl Term {
    pub fn entity(name: impl Into<String>) -> Self {
        Term::Entity(name.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Term::Literal(text.into())
    }

    pub fn as_entity(&self) -> Option<&str> {
        match self {
            Term::Entity(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Term::Literal(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Entity(name) => write!(f, "{}", name),
            Term::Literal(text) => write!(f, "{:?}", text),
        }
    }
}

/// A `(subject, relation, object)` triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub subject: String,
    pub relation: Relation,
    pub object: Term,
}

impl Fact {
    pub fn new(subject: impl Into<String>, relation: Relation, object: Term) -> Self {
        Self {
            subject: subject.into(),
            relation,
            object,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.relation, self.object)
    }
}

/// The relationship graph
#[derive(Debug, Default)]
pub struct TaxonomyGraph {
    /// Entity nodes; edges mirror entity-to-entity facts
    pub(crate) graph: DiGraph<String, Relation>,

    /// Node index lookup: name -> NodeIndex
    pub(crate) node_indices: HashMap<String, NodeIndex>,

    /// Declared roles per identifier
    pub(crate) entity_kinds: HashMap<String, BTreeSet<EntityKind>>,

    /// Identifiers in first-declaration order
    pub(crate) declared: Vec<String>,

    /// Fact log in insertion order
    pub(crate) facts: Vec<Fact>,

    /// Exact-duplicate guard
    pub(crate) fact_set: HashSet<Fact>,

    /// Index: subject -> positions in `facts`
    pub(crate) by_subject: HashMap<String, Vec<usize>>,

    /// Index: object -> positions in `facts`
    pub(crate) by_object: HashMap<Term, Vec<usize>>,

    pub(crate) diagnostics: Diagnostics,
}

impl TaxonomyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` as an entity of `kind`.
    ///
    /// Returns `true` when the role is new for this identifier. A role that is
    /// incompatible with an earlier one is still recorded, and reported.
    pub fn declare(&mut self, name: &str, kind: EntityKind) -> bool {
        self.ensure_node(name);

        if !self.entity_kinds.contains_key(name) {
            self.declared.push(name.to_string());
        }
        let roles = self.entity_kinds.entry(name.to_string()).or_default();

        if roles.contains(&kind) {
            return false;
        }

        let conflicts: Vec<EntityKind> = roles
            .iter()
            .copied()
            .filter(|existing| !existing.compatible_with(kind))
            .collect();
        roles.insert(kind);

        if !conflicts.is_empty() {
            tracing::warn!(
                ident = name,
                role = %kind,
                existing = ?conflicts,
                "identifier declared with conflicting roles"
            );
            self.diagnostics.name_collision(name, kind, &conflicts);
        }

        true
    }

    /// Insert a fact. Exact duplicates are ignored; returns `true` if the fact
    /// was new.
    pub fn add(&mut self, subject: &str, relation: Relation, object: Term) -> bool {
        let fact = Fact::new(subject, relation, object);
        if self.fact_set.contains(&fact) {
            return false;
        }

        let from = self.ensure_node(subject);
        if let Some(target) = fact.object.as_entity() {
            let to = self.ensure_node(target);
            self.graph.add_edge(from, to, relation);
        }

        let pos = self.facts.len();
        self.by_subject.entry(fact.subject.clone()).or_default().push(pos);
        self.by_object.entry(fact.object.clone()).or_default().push(pos);
        self.fact_set.insert(fact.clone());
        self.facts.push(fact);
        true
    }

    /// Insert an entity-to-entity fact
    pub fn relate(&mut self, subject: &str, relation: Relation, object: &str) -> bool {
        self.add(subject, relation, Term::entity(object))
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_indices.insert(name.to_string(), idx);
        idx
    }

    // ========== Public API ==========

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Number of distinct identifiers (declared or referenced)
    pub fn entity_count(&self) -> usize {
        self.node_indices.len()
    }

    /// All facts in insertion order
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn contains(&self, subject: &str, relation: Relation, object: &Term) -> bool {
        self.fact_set.contains(&Fact::new(subject, relation, object.clone()))
    }

    /// Roles declared for `name`
    pub fn kinds_of(&self, name: &str) -> Option<&BTreeSet<EntityKind>> {
        self.entity_kinds.get(name)
    }

    pub fn is_a(&self, name: &str, kind: EntityKind) -> bool {
        self.entity_kinds.get(name).is_some_and(|k| k.contains(&kind))
    }

    /// Diagnostics found while working on this graph
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Move the collected diagnostics out of the graph
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// SHA256 over the fact log; equal for byte-identical fact sequences
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for fact in &self.facts {
            hasher.update(fact.to_string().as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }

    /// Export the subclass lattice to GraphViz DOT format
    pub fn to_dot(&self) -> String {
        let mut output = String::new();

        output.push_str("digraph Taxonomy {\n");
        output.push_str("  rankdir=BT;\n");
        output.push_str(
            "  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10];\n",
        );
        output.push_str("\n");

        let color_map = [
            (EntityKind::GeneratedClass, "#FF9800"),
            (EntityKind::Kind, "#00BCD4"),
            (EntityKind::Trait, "#9C27B0"),
        ];

        for name in &self.declared {
            let Some(roles) = self.entity_kinds.get(name) else {
                continue;
            };
            if roles.len() == 1 && roles.contains(&EntityKind::Tag) {
                continue;
            }
            let color = color_map
                .iter()
                .find(|(kind, _)| roles.contains(kind))
                .map(|(_, color)| *color)
                .unwrap_or("#9E9E9E");
            output.push_str(&format!("  {} [fillcolor=\"{}\"];\n", dot_id(name), color));
        }

        output.push_str("\n");

        for edge in self.graph.edge_references() {
            if *edge.weight() != Relation::SubclassOf {
                continue;
            }
            if let (Some(source), Some(target)) = (
                self.graph.node_weight(edge.source()),
                self.graph.node_weight(edge.target()),
            ) {
                output.push_str(&format!("  {} -> {};\n", dot_id(source), dot_id(target)));
            }
        }

        output.push_str("}\n");
        output
    }
}

/// Quoted DOT identifier
fn dot_id(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}
