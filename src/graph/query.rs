//! Query Layer
//!
//! Pattern matching over the relationship graph. Every result preserves fact
//! insertion order.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use petgraph::algo::is_cyclic_directed;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashSet;

use super::{EntityKind, Fact, Relation, TaxonomyGraph, Term};

/// A partially specified triple; `None` matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    pub subject: Option<String>,
    pub relation: Option<Relation>,
    pub object: Option<Term>,
}

impl Pattern {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn relation(mut self, relation: Relation) -> Self {
        self.relation = Some(relation);
        self
    }

    pub fn object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    pub fn matches(&self, fact: &Fact) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == fact.subject)
            && self.relation.map_or(true, |r| r == fact.relation)
            && self.object.as_ref().map_or(true, |o| *o == fact.object)
    }
}

/// An ancestor reached through `subclass-of`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    pub name: String,
    pub depth: usize,
}

impl TaxonomyGraph {
    /// All facts matching `pattern`, in insertion order
    pub fn query(&self, pattern: &Pattern) -> Vec<&Fact> {
        let positions: Box<dyn Iterator<Item = usize> + '_> =
            if let Some(subject) = &pattern.subject {
                Box::new(self.by_subject.get(subject).into_iter().flatten().copied())
            } else if let Some(object) = &pattern.object {
                Box::new(self.by_object.get(object).into_iter().flatten().copied())
            } else {
                Box::new(0..self.facts.len())
            };

        positions
            .map(|pos| &self.facts[pos])
            .filter(|fact| pattern.matches(fact))
            .collect()
    }

    /// Entity objects of `subject relation ?`
    pub fn objects(&self, subject: &str, relation: Relation) -> Vec<&str> {
        self.query(&Pattern::any().subject(subject).relation(relation))
            .into_iter()
            .filter_map(|f| f.object.as_entity())
            .collect()
    }

    /// Subjects of `? relation object`
    pub fn subjects(&self, relation: Relation, object: &str) -> Vec<&str> {
        self.query(&Pattern::any().relation(relation).object(Term::entity(object)))
            .into_iter()
            .map(|f| f.subject.as_str())
            .collect()
    }

    /// Literal definitions attached to `subject`
    pub fn definitions(&self, subject: &str) -> Vec<&str> {
        self.query(&Pattern::any().subject(subject).relation(Relation::HasDefinition))
            .into_iter()
            .filter_map(|f| f.object.as_literal())
            .collect()
    }

    /// Identifiers declared with `kind`, in declaration order
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<&str> {
        self.declared
            .iter()
            .filter(|name| self.is_a(name, kind))
            .map(String::as_str)
            .collect()
    }

    /// Transitive `subclass-of` closure, nearest first
    pub fn ancestors(&self, name: &str) -> Vec<Ancestor> {
        let Some(&start) = self.node_indices.get(name) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut visited = HashSet::from([start]);
        let mut frontier = vec![start];
        let mut depth = 0;

        while !frontier.is_empty() {
            depth += 1;
            let mut next = Vec::new();
            for node in frontier {
                for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                    if *edge.weight() != Relation::SubclassOf || !visited.insert(edge.target()) {
                        continue;
                    }
                    next.push(edge.target());
                }
            }
            let mut layer: Vec<&String> =
                next.iter().filter_map(|&idx| self.graph.node_weight(idx)).collect();
            layer.sort();
            result.extend(layer.into_iter().map(|n| Ancestor { name: n.clone(), depth }));
            frontier = next;
        }

        result
    }

    /// Whether any chain of `subclass-of` facts loops back on itself
    pub fn has_subclass_cycle(&self) -> bool {
        let lattice = self.graph.filter_map(
            |_, name| Some(name.clone()),
            |_, rel| (*rel == Relation::SubclassOf).then_some(*rel),
        );
        is_cyclic_directed(&lattice)
    }

    /// Closest declared names of `kind` to `query`, best first
    pub fn suggest(&self, query: &str, kind: EntityKind, limit: usize) -> Vec<&str> {
        let matcher = SkimMatcherV2::default();
        let mut results: Vec<(i64, &str)> = self
            .entities_of_kind(kind)
            .into_iter()
            .filter_map(|name| matcher.fuzzy_match(name, query).map(|score| (score, name)))
            .collect();

        results.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        results.into_iter().take(limit).map(|(_, name)| name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TaxonomyGraph {
        let mut graph = TaxonomyGraph::new();
        graph.declare("WaterPoint", EntityKind::Kind);
        graph.declare("WaterType", EntityKind::Trait);
        graph.declare("WaterPointQuantity", EntityKind::Trait);
        graph.relate("WaterPoint", Relation::SubclassOf, "Point");
        graph.relate("WaterPoint", Relation::HasTrait, "WaterType");
        graph.relate("WaterPoint", Relation::HasTrait, "WaterPointQuantity");
        graph.relate("WaterType", Relation::HasTag, "Chilled");
        graph.relate("WaterType", Relation::HasTag, "Condenser");
        graph.relate("Point", Relation::SubclassOf, "Entity");
        graph
    }

    #[test]
    fn test_objects_preserve_insertion_order() {
        let graph = sample();
        assert_eq!(
            graph.objects("WaterPoint", Relation::HasTrait),
            vec!["WaterType", "WaterPointQuantity"]
        );
        assert_eq!(graph.objects("WaterType", Relation::HasTag), vec!["Chilled", "Condenser"]);
    }

    #[test]
    fn test_query_by_relation_only() {
        let graph = sample();
        let subclass = graph.query(&Pattern::any().relation(Relation::SubclassOf));
        assert_eq!(subclass.len(), 2);
        assert_eq!(subclass[0].subject, "WaterPoint");
        assert_eq!(graph.subjects(Relation::HasTag, "Chilled"), vec!["WaterType"]);
    }

    #[test]
    fn test_ancestors_and_cycles() {
        let mut graph = sample();
        let names: Vec<_> =
            graph.ancestors("WaterPoint").into_iter().map(|a| (a.name, a.depth)).collect();
        assert_eq!(names, vec![("Point".to_string(), 1), ("Entity".to_string(), 2)]);
        assert!(!graph.has_subclass_cycle());

        graph.relate("Entity", Relation::SubclassOf, "WaterPoint");
        assert!(graph.has_subclass_cycle());
    }

    #[test]
    fn test_suggest_trait_names() {
        let graph = sample();
        let hits = graph.suggest("WtrType", EntityKind::Trait, 1);
        assert_eq!(hits, vec!["WaterType"]);
    }
}
