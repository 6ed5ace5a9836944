//! Graph export
//!
//! Encodes the accumulated facts for downstream tools: a JSON fact list,
//! N-Triples against configurable namespaces, or a DOT rendering of the
//! subclass lattice.

use serde::Serialize;
use std::fs;
use std::io::Write;

use crate::config::{ExportFormat, ExportSettings};
use crate::error::Result;
use crate::graph::{EntityKind, Fact, Relation, TaxonomyGraph, Term};

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";

#[derive(Serialize)]
struct JsonExport<'a> {
    fingerprint: String,
    fact_count: usize,
    facts: &'a [Fact],
}

/// Pretty JSON document holding every fact in insertion order
pub fn to_json(graph: &TaxonomyGraph) -> Result<String> {
    let doc = JsonExport {
        fingerprint: graph.fingerprint(),
        fact_count: graph.fact_count(),
        facts: graph.facts(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// N-Triples: type declarations for every declared entity, then the facts
pub fn to_ntriples(graph: &TaxonomyGraph, settings: &ExportSettings) -> String {
    let class_iri =
        |name: &str| format!("<{}{}>", settings.class_namespace, urlencoding::encode(name));
    let mut output = String::new();

    for name in graph.declared.iter() {
        let Some(roles) = graph.kinds_of(name) else {
            continue;
        };
        for role in roles {
            let type_iri = match role {
                EntityKind::Kind | EntityKind::GeneratedClass => format!("<{}>", OWL_CLASS),
                EntityKind::Tag => class_iri("Tag"),
                EntityKind::Trait => class_iri("Trait"),
            };
            output.push_str(&format!("{} <{}> {} .\n", class_iri(name), RDF_TYPE, type_iri));
        }
    }

    for fact in graph.facts() {
        let predicate = match fact.relation {
            Relation::SubclassOf => RDFS_SUBCLASS_OF.to_string(),
            Relation::HasTag => format!("{}hasTag", settings.frame_namespace),
            Relation::HasTrait => format!("{}hasTrait", settings.frame_namespace),
            Relation::HasDefinition => format!("{}hasDefinition", settings.frame_namespace),
        };
        let object = match &fact.object {
            Term::Entity(name) => class_iri(name),
            Term::Literal(text) => format!("\"{}\"", escape_literal(text)),
        };
        let subject = class_iri(&fact.subject);
        output.push_str(&format!("{} <{}> {} .\n", subject, predicate, object));
    }

    output
}

fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render in the configured format
pub fn render(graph: &TaxonomyGraph, settings: &ExportSettings) -> Result<String> {
    match settings.format {
        ExportFormat::Json => to_json(graph),
        ExportFormat::Ntriples => Ok(to_ntriples(graph, settings)),
        ExportFormat::Dot => Ok(graph.to_dot()),
    }
}

/// Render and write to the configured output, or stdout
pub fn write(graph: &TaxonomyGraph, settings: &ExportSettings) -> Result<()> {
    let content = render(graph, settings)?;
    match &settings.output {
        Some(path) => {
            fs::write(path, content)?;
            tracing::info!(path = %path.display(), format = ?settings.format, "graph exported");
        }
        None => {
            std::io::stdout().write_all(content.as_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> TaxonomyGraph {
        let mut graph = TaxonomyGraph::new();
        graph.declare("FlowSensor", EntityKind::GeneratedClass);
        graph.declare("Flow", EntityKind::Tag);
        graph.relate("FlowSensor", Relation::SubclassOf, "WaterPoint");
        graph.relate("FlowSensor", Relation::HasTag, "Flow");
        graph.add("Flow", Relation::HasDefinition, Term::literal("Rate of \"flow\""));
        graph
    }

    #[test]
    fn test_ntriples_lines() {
        let nt = to_ntriples(&small_graph(), &ExportSettings::default());
        assert!(nt.contains(
            "<https://brickschema.org/schema/1.0.3/Brick#FlowSensor> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2002/07/owl#Class> ."
        ));
        assert!(nt.contains(
            "<https://brickschema.org/schema/1.0.3/Brick#FlowSensor> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <https://brickschema.org/schema/1.0.3/Brick#WaterPoint> ."
        ));
        assert!(nt.contains("\"Rate of \\\"flow\\\"\" ."));
        assert_eq!(nt.lines().count(), 5);
    }

    #[test]
    fn test_ntriples_encodes_identifiers() {
        let mut graph = TaxonomyGraph::new();
        graph.declare("Hot Water>", EntityKind::Kind);
        graph.relate("Hot Water>", Relation::SubclassOf, "Point");
        let nt = to_ntriples(&graph, &ExportSettings::default());

        assert!(nt.contains("<https://brickschema.org/schema/1.0.3/Brick#Hot%20Water%3E>"));
        assert!(!nt.contains("Hot Water"));
        for line in nt.lines() {
            assert_eq!(line.matches('<').count(), line.matches('>').count(), "{}", line);
        }
    }

    #[test]
    fn test_json_export() {
        let json = to_json(&small_graph()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["fact_count"], 3);
        assert_eq!(value["facts"][0]["relation"], "subclass-of");
        assert_eq!(value["facts"][2]["object"]["type"], "literal");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lattice.dot");
        let settings = ExportSettings {
            format: ExportFormat::Dot,
            output: Some(path.clone()),
            ..ExportSettings::default()
        };
        write(&small_graph(), &settings).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("digraph Taxonomy {"));
    }
}
