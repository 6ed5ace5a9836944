//! Graph Population
//!
//! Turns a [`SchemaModel`] into directly-authored facts: class declarations,
//! definitions, superkind links, marker tags and trait references.

use crate::schema::SchemaModel;

use super::{EntityKind, Relation, TaxonomyGraph, Term};

/// Add every kind in `model` to `graph`.
///
/// Undeclared superkinds are materialized as empty kind stubs.
pub fn populate(graph: &mut TaxonomyGraph, model: &SchemaModel) {
    let before = graph.fact_count();

    for kind in model.kinds() {
        graph.declare(&kind.name, EntityKind::Kind);
        if let Some(doc) = &kind.doc {
            graph.add(&kind.name, Relation::HasDefinition, Term::literal(doc.clone()));
        }

        graph.declare(&kind.superkind, EntityKind::Kind);
        graph.relate(&kind.name, Relation::SubclassOf, &kind.superkind);

        for tag in &kind.tags {
            graph.declare(&tag.name, EntityKind::Tag);
            graph.relate(&kind.name, Relation::HasTag, &tag.name);
            if let Some(doc) = &tag.doc {
                graph.add(&tag.name, Relation::HasDefinition, Term::literal(doc.clone()));
            }
        }

        for trait_name in &kind.traits {
            graph.declare(trait_name, EntityKind::Trait);
            graph.relate(&kind.name, Relation::HasTrait, trait_name);
        }
    }

    tracing::info!(
        kinds = model.len(),
        facts = graph.fact_count() - before,
        "populated relationship graph from schema"
    );
}
