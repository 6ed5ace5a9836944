//! Haystack → Brick class synthesis
//!
//! Converts a taxonomy of Haystack kinds (equipment, points, tags, traits)
//! into a Brick-style class lattice of typed entities and relations.
//!
//! ## Features
//!
//! - **Schema Model**: kinds with their superkind, marker tags and traits
//! - **Relationship Graph**: append-only, insertion-ordered fact store with pattern queries
//! - **Class Generation**: ordered Cartesian expansion of trait/tag dimensions
//! - **Hierarchy Inference**: parents among generated classes by suffix containment
//! - **Export**: JSON, N-Triples and DOT
//!
//! ## Architecture
//!
//! ```text
//! defs.json ──► SchemaModel ──populate──► TaxonomyGraph ◄──┐
//!                                              │           │ write
//!                                              └─query──► ClassGenerator
//!                                                           (+ ParentPolicy)
//! TaxonomyGraph ──► export (json | ntriples | dot)
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod pipeline;
pub mod schema;
pub mod synth;

pub use config::SynthConfig;
pub use error::{Result, SynthError};
pub use graph::{Diagnostics, EntityKind, Fact, Pattern, Relation, TaxonomyGraph, Term};
pub use pipeline::{run, run_model, SynthesisRun};
pub use schema::{KindDef, SchemaModel};
pub use synth::{ClassGenerator, GeneratedClass, SynthesisSpec};
