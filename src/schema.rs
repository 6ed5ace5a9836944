//! Schema Model
//!
//! Deserializes Haystack-style definition documents and normalizes their kind
//! records into [`KindDef`]s. A document is a list of namespaced sections, each
//! holding kind records:
//!
//! ```json
//! [
//!   { "name": "phIoT", "kinds": [
//!       { "name": "WaterPoint", "superkind": "phIoT::Point",
//!         "tags": [{ "name": "water", "kind": "ph::Marker" }],
//!         "traits": ["phIoT::WaterType"] }
//!   ]}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::SchemaSettings;
use crate::error::{Result, SynthError};
use crate::graph::Diagnostics;

/// Separator between a namespace and a local name (`phIoT::WaterPoint`)
pub const NAMESPACE_SEPARATOR: &str = "::";

// =============================================================================
// Raw records
// =============================================================================

/// A namespaced section of the schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kinds: Vec<RawKind>,
}

/// A kind record as it appears in the document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawKind {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superkind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<RawTag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<String>,
}

/// A tag definition attached to a kind record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTag {
    pub name: String,
    /// Tag-kind discriminator, e.g. `ph::Marker` or `ph::Str`
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Parse a whole schema document
pub fn parse_document(content: &str) -> Result<Vec<SchemaSection>> {
    Ok(serde_json::from_str(content)?)
}

// =============================================================================
// Normalized definitions
// =============================================================================

/// A marker tag retained for the ontology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDef {
    /// Normalized tag name
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// A fully normalized kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Superkind with its namespace stripped; may not be defined anywhere
    pub superkind: String,
    pub tags: Vec<TagDef>,
    /// Trait names with their namespace stripped
    pub traits: Vec<String>,
}

impl KindDef {
    /// Normalize a raw record, keeping only tags whose discriminator is exactly
    /// `marker_kind` (namespace included).
    pub fn from_raw(raw: &RawKind, marker_kind: &str) -> Result<Self> {
        let superkind = raw
            .superkind
            .as_deref()
            .map(strip_namespace)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SynthError::MissingSuperkind { kind: raw.name.clone() })?;

        let tags = raw
            .tags
            .iter()
            .filter(|t| t.kind == marker_kind)
            .map(|t| TagDef {
                name: normalize_tag(&t.name),
                doc: t.doc.clone(),
            })
            .collect();

        Ok(Self {
            name: raw.name.clone(),
            doc: raw.doc.clone(),
            superkind: superkind.to_string(),
            tags,
            traits: raw.traits.iter().map(|t| strip_namespace(t).to_string()).collect(),
        })
    }
}

/// Drop everything up to and including the last `::`
pub fn strip_namespace(name: &str) -> &str {
    name.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(name)
}

/// Canonical tag capitalization: first character upper-cased, the rest
/// lower-cased. Idempotent.
pub fn normalize_tag(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Schema Model
// =============================================================================

/// Kinds indexed by name, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    kinds: Vec<KindDef>,
    by_name: HashMap<String, usize>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and normalize a schema file
    pub fn load_from(
        path: &Path,
        settings: &SchemaSettings,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let sections = parse_document(&content)?;
        tracing::debug!(
            path = %path.display(),
            sections = sections.len(),
            "parsed schema document"
        );
        Self::from_sections(&sections, settings, diagnostics)
    }

    /// Build the model from parsed sections.
    ///
    /// Only the sections named in `settings.sections` are read (all of them when
    /// the list is empty). A missing superkind aborts the load.
    pub fn from_sections(
        sections: &[SchemaSection],
        settings: &SchemaSettings,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        for wanted in &settings.sections {
            if !sections.iter().any(|s| s.name.as_deref() == Some(wanted.as_str())) {
                return Err(SynthError::SectionNotFound(wanted.clone()));
            }
        }

        let mut model = Self::new();
        let selected = sections.iter().filter(|s| {
            settings.sections.is_empty()
                || s.name.as_ref().is_some_and(|n| settings.sections.contains(n))
        });

        for section in selected {
            for raw in &section.kinds {
                let kind = KindDef::from_raw(raw, &settings.marker_kind)?;
                if model.insert(kind) {
                    tracing::warn!(kind = %raw.name, "duplicate kind, keeping the later one");
                    diagnostics.duplicate_kind(&raw.name);
                }
            }
        }

        tracing::info!(kinds = model.len(), "schema model loaded");
        Ok(model)
    }

    /// Insert a kind, replacing any earlier kind of the same name in place.
    /// Returns `true` when a definition was replaced.
    pub fn insert(&mut self, kind: KindDef) -> bool {
        match self.by_name.get(&kind.name) {
            Some(&idx) => {
                self.kinds[idx] = kind;
                true
            }
            None => {
                self.by_name.insert(kind.name.clone(), self.kinds.len());
                self.kinds.push(kind);
                false
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&KindDef> {
        self.by_name.get(name).map(|&idx| &self.kinds[idx])
    }

    pub fn kinds(&self) -> impl Iterator<Item = &KindDef> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
