//! Diagnostics
//!
//! Collects the non-fatal conditions found while loading and generating.
//! The run always completes; callers decide what to do with the report.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::EntityKind;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Schema ===
    /// Two kind records share a name; the later one replaced the earlier
    DuplicateKind,

    // === Namespace ===
    /// One identifier declared with incompatible entity kinds (e.g. Tag and Kind)
    NameCollision,

    // === Generation ===
    /// A dimension resolved to zero candidate tags
    UnresolvedDimension,
    /// A synthesis spec names a base class that is not in the graph
    UnknownBaseClass,
    /// The point-type class carries no tags
    EmptyPointTypes,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateKind => "W001",
            Self::NameCollision => "W002",
            Self::UnresolvedDimension => "W003",
            Self::UnknownBaseClass => "W004",
            Self::EmptyPointTypes => "W005",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnknownBaseClass => Severity::Info,
            Self::DuplicateKind
            | Self::NameCollision
            | Self::UnresolvedDimension
            | Self::EmptyPointTypes => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Info items never fail a run; warnings only flag it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
        })
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Identifier the diagnostic is about (kind, tag, class or dimension key)
    pub subject: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Suggestions and conflicting roles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(
        subject: impl Into<String>,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}: {}", self.code, self.severity(), self.subject, self.message)?;
        for ctx in &self.context {
            write!(f, "\n    {}", ctx)?;
        }
        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Diagnostics gathered over one synthesis run, in discovery order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    /// A kind record replaced an earlier one with the same name
    pub fn duplicate_kind(&mut self, kind: &str) {
        self.push(DiagnosticItem::new(
            kind,
            DiagnosticCode::DuplicateKind,
            "defined more than once; the later definition wins",
        ));
    }

    /// `name` gained `role` while already holding the incompatible `existing` roles
    pub fn name_collision(&mut self, name: &str, role: EntityKind, existing: &[EntityKind]) {
        let existing: Vec<&str> = existing.iter().map(EntityKind::as_str).collect();
        self.push(
            DiagnosticItem::new(
                name,
                DiagnosticCode::NameCollision,
                format!("declared as {} but already used as {}", role, existing.join(", ")),
            )
            .with_context("later facts about this identifier share one namespace entry"),
        );
    }

    /// Trait `key` of `base` carries no tags
    pub fn unresolved_dimension(&mut self, key: &str, base: &str) {
        self.push(
            DiagnosticItem::new(
                key,
                DiagnosticCode::UnresolvedDimension,
                format!("trait of '{}' carries no tags", base),
            )
            .with_context("every suffix including this dimension generates nothing"),
        );
    }

    /// `base` is not in the graph; `suggestions` are the closest known kinds
    pub fn unknown_base_class<S: AsRef<str>>(&mut self, base: &str, suggestions: &[S]) {
        let mut item = DiagnosticItem::new(
            base,
            DiagnosticCode::UnknownBaseClass,
            "base class is not defined; all dimension keys are literal tags",
        );
        for suggestion in suggestions {
            item = item.with_context(format!("did you mean '{}'?", suggestion.as_ref()));
        }
        self.push(item);
    }

    pub fn empty_point_types(&mut self, point_type_class: &str) {
        self.push(DiagnosticItem::new(
            point_type_class,
            DiagnosticCode::EmptyPointTypes,
            "point-type class has no tags, so no classes can be generated",
        ));
    }

    /// Items carrying the given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Append `other` after the items already collected
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}

/// One item per line, then a severity tally
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        let warnings = self.warning_count();
        writeln!(f, "\n{} warning(s), {} info", warnings, self.len() - warnings)
    }
}
