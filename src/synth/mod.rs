//! Class Generator
//!
//! Expands synthesis specs into concrete classes. For each spec the generator
//!
//! 1. resolves every dimension key against the base class's traits (a trait
//!    expands to the tags it carries, anything else is a literal tag),
//! 2. appends the point-type dimension,
//! 3. walks the dimension suffixes from the last dimension alone up to the
//!    full list, emitting one class per tuple of the ordered product.
//!
//! Shorter suffixes go first so that the general classes they produce are
//! already known when the longer, more specific ones look for a parent.
//!
//! ```text
//! WaterPoint [WaterType, WaterPointQuantity] + PointType
//!
//!   [PointType]                        Sensor, Cmd
//!   [WaterPointQuantity, PointType]    FlowSensor -> Sensor, ...
//!   [WaterType, ..., PointType]        ChilledFlowSensor -> FlowSensor, ...
//! ```

pub mod hierarchy;
pub mod naming;
pub mod product;

pub use hierarchy::{infer_parent, NameSuffix, ParentPolicy, ParentPolicyKind, TagSubsequence};
pub use naming::Naming;
pub use product::ordered_product;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::GenerationSettings;
use crate::graph::{EntityKind, Relation, TaxonomyGraph};

/// A base class plus the ordered dimension keys to expand it by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisSpec {
    pub base: String,
    pub dimensions: Vec<String>,
}

impl SynthesisSpec {
    pub fn new<S: Into<String>>(
        base: impl Into<String>,
        dimensions: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            base: base.into(),
            dimensions: dimensions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Where a dimension's candidates came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DimensionOrigin {
    /// Tags carried by a trait of the base class
    Trait,
    /// The key itself, used verbatim as a tag
    Literal,
    /// Tags of the point-type class
    PointType,
}

/// One resolved axis of variation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub key: String,
    pub origin: DimensionOrigin,
    pub candidates: Vec<String>,
}

/// A synthesized class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedClass {
    pub name: String,
    /// Tags in build order
    pub tuple: Vec<String>,
    /// Base class of the spec that produced it
    pub base: String,
    /// Inferred parent, or `base` when no generated class qualifies
    pub parent: String,
}

impl GeneratedClass {
    /// A class parented to `base` until inference says otherwise
    pub fn new(naming: &Naming, tuple: Vec<String>, base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            name: naming.class_name(&tuple),
            tuple,
            parent: base.clone(),
            base,
        }
    }

    /// Order-independent tag set
    pub fn tags(&self) -> BTreeSet<&str> {
        self.tuple.iter().map(String::as_str).collect()
    }

    pub fn has_generated_parent(&self) -> bool {
        self.parent != self.base
    }
}

/// Per-spec outcome
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecSummary {
    pub base: String,
    pub dimensions: Vec<Dimension>,
    pub classes: usize,
}

/// Outcome of a whole generation pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub point_types: Vec<String>,
    pub specs: Vec<SpecSummary>,
    pub classes: usize,
    pub facts_added: usize,
}

/// Expands synthesis specs into the graph
#[derive(Debug)]
pub struct ClassGenerator {
    naming: Naming,
    policy: Box<dyn ParentPolicy>,
    point_type_class: String,
    generated: Vec<GeneratedClass>,
}

impl ClassGenerator {
    pub fn new(settings: &GenerationSettings) -> Self {
        let naming = Naming::separated(settings.separator.clone());
        let policy = settings.parent_policy.build(&naming);
        Self::with_policy(naming, policy, settings.point_type_class.clone())
    }

    pub fn with_policy(
        naming: Naming,
        policy: Box<dyn ParentPolicy>,
        point_type_class: impl Into<String>,
    ) -> Self {
        Self {
            naming,
            policy,
            point_type_class: point_type_class.into(),
            generated: Vec::new(),
        }
    }

    /// Every class generated so far, in generation order
    pub fn generated(&self) -> &[GeneratedClass] {
        &self.generated
    }

    pub fn into_generated(self) -> Vec<GeneratedClass> {
        self.generated
    }

    /// Tags marked as point-type discriminators (sensor, cmd, sp, ...)
    pub fn point_types<'g>(&self, graph: &'g TaxonomyGraph) -> Vec<&'g str> {
        graph.objects(&self.point_type_class, Relation::HasTag)
    }

    /// Run every spec in order
    pub fn generate(
        &mut self,
        graph: &mut TaxonomyGraph,
        specs: &[SynthesisSpec],
    ) -> GenerationReport {
        let facts_before = graph.fact_count();
        let classes_before = self.generated.len();

        let point_types: Vec<String> =
            self.point_types(graph).into_iter().map(str::to_string).collect();
        if point_types.is_empty() {
            tracing::warn!(
                class = %self.point_type_class,
                "point-type class carries no tags; every suffix will be empty"
            );
            graph.diagnostics_mut().empty_point_types(&self.point_type_class);
        }

        let mut summaries = Vec::with_capacity(specs.len());
        for spec in specs {
            summaries.push(self.generate_spec(graph, spec, &point_types));
        }

        let report = GenerationReport {
            point_types,
            specs: summaries,
            classes: self.generated.len() - classes_before,
            facts_added: graph.fact_count() - facts_before,
        };
        tracing::info!(classes = report.classes, facts = report.facts_added, "generation finished");
        report
    }

    /// Resolve dimension keys for one spec (without the point-type dimension)
    pub fn resolve(&self, graph: &mut TaxonomyGraph, spec: &SynthesisSpec) -> Vec<Dimension> {
        let traits: Vec<String> = graph
            .objects(&spec.base, Relation::HasTrait)
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut dimensions = Vec::with_capacity(spec.dimensions.len() + 1);
        for key in &spec.dimensions {
            let dimension = if traits.contains(key) {
                let candidates = graph
                    .objects(key, Relation::HasTag)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                Dimension { key: key.clone(), origin: DimensionOrigin::Trait, candidates }
            } else {
                Dimension {
                    key: key.clone(),
                    origin: DimensionOrigin::Literal,
                    candidates: vec![key.clone()],
                }
            };

            if dimension.candidates.is_empty() {
                tracing::warn!(
                    base = %spec.base,
                    dimension = %key,
                    "dimension resolved to no tags"
                );
                graph.diagnostics_mut().unresolved_dimension(key, &spec.base);
            }
            dimensions.push(dimension);
        }
        dimensions
    }

    fn generate_spec(
        &mut self,
        graph: &mut TaxonomyGraph,
        spec: &SynthesisSpec,
        point_types: &[String],
    ) -> SpecSummary {
        if graph.kinds_of(&spec.base).is_none() {
            let suggestions: Vec<String> = graph
                .suggest(&spec.base, EntityKind::Kind, 3)
                .into_iter()
                .map(str::to_string)
                .collect();
            tracing::debug!(base = %spec.base, ?suggestions, "unknown base class");
            graph.diagnostics_mut().unknown_base_class(&spec.base, &suggestions);
        }

        let mut dimensions = self.resolve(graph, spec);
        dimensions.push(Dimension {
            key: self.point_type_class.clone(),
            origin: DimensionOrigin::PointType,
            candidates: point_types.to_vec(),
        });

        let before = self.generated.len();
        for len in 1..=dimensions.len() {
            let suffix = &dimensions[dimensions.len() - len..];
            for tuple in ordered_product(suffix.iter().map(|d| d.candidates.as_slice())) {
                self.emit(graph, tuple, &spec.base);
            }
        }

        let classes = self.generated.len() - before;
        tracing::debug!(base = %spec.base, classes, "spec expanded");
        SpecSummary { base: spec.base.clone(), dimensions, classes }
    }

    fn emit(&mut self, graph: &mut TaxonomyGraph, tuple: Vec<String>, base: &str) {
        let mut class = GeneratedClass::new(&self.naming, tuple, base);
        if let Some(parent) = infer_parent(self.policy.as_ref(), &self.generated, &class) {
            class.parent = parent.name.clone();
        }

        graph.declare(&class.name, EntityKind::GeneratedClass);
        graph.relate(&class.name, Relation::SubclassOf, base);
        if class.has_generated_parent() {
            graph.relate(&class.name, Relation::SubclassOf, &class.parent);
        }
        for tag in &class.tuple {
            graph.declare(tag, EntityKind::Tag);
            graph.relate(&class.name, Relation::HasTag, tag);
        }

        self.generated.push(class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiagnosticCode;

    fn water_graph() -> TaxonomyGraph {
        let mut graph = TaxonomyGraph::new();
        graph.declare("PointType", EntityKind::Kind);
        graph.relate("PointType", Relation::HasTag, "Sensor");
        graph.relate("PointType", Relation::HasTag, "Cmd");

        graph.declare("WaterPoint", EntityKind::Kind);
        graph.relate("WaterPoint", Relation::HasTrait, "WaterType");
        graph.relate("WaterPoint", Relation::HasTrait, "WaterPointQuantity");
        graph.relate("WaterType", Relation::HasTag, "Chilled");
        graph.relate("WaterType", Relation::HasTag, "Condenser");
        graph.relate("WaterPointQuantity", Relation::HasTag, "Flow");
        graph.relate("WaterPointQuantity", Relation::HasTag, "Temp");
        graph
    }

    fn generator() -> ClassGenerator {
        ClassGenerator::new(&GenerationSettings::default())
    }

    fn water_spec() -> SynthesisSpec {
        SynthesisSpec::new("WaterPoint", ["WaterType", "WaterPointQuantity"])
    }

    fn find<'a>(gen: &'a ClassGenerator, name: &str) -> &'a GeneratedClass {
        gen.generated().iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_resolve_traits_and_literals() {
        let mut graph = water_graph();
        let gen = generator();
        let spec = SynthesisSpec::new("WaterPoint", ["WaterType", "Water"]);
        let dims = gen.resolve(&mut graph, &spec);

        assert_eq!(dims[0].origin, DimensionOrigin::Trait);
        assert_eq!(dims[0].candidates, vec!["Chilled", "Condenser"]);
        assert_eq!(dims[1].origin, DimensionOrigin::Literal);
        assert_eq!(dims[1].candidates, vec!["Water"]);
    }

    #[test]
    fn test_suffix_expansion_counts() {
        let mut graph = water_graph();
        let mut gen = generator();
        let report = gen.generate(&mut graph, &[water_spec()]);

        // 2 + 2*2 + 2*2*2
        assert_eq!(report.classes, 14);
        let names: Vec<&str> = gen.generated().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(&names[..4], &["Sensor", "Cmd", "FlowSensor", "FlowCmd"]);
        assert_eq!(names.last(), Some(&"CondenserTempCmd"));
    }

    #[test]
    fn test_parents_follow_suffixes() {
        let mut graph = water_graph();
        let mut gen = generator();
        gen.generate(&mut graph, &[water_spec()]);

        assert_eq!(find(&gen, "Sensor").parent, "WaterPoint");
        assert_eq!(find(&gen, "FlowSensor").parent, "Sensor");
        assert_eq!(find(&gen, "ChilledFlowSensor").parent, "FlowSensor");
        assert_eq!(find(&gen, "CondenserTempCmd").parent, "TempCmd");

        let supers = graph.objects("ChilledFlowSensor", Relation::SubclassOf);
        assert_eq!(supers, vec!["WaterPoint", "FlowSensor"]);
        assert_eq!(
            graph.objects("ChilledFlowSensor", Relation::HasTag),
            vec!["Chilled", "Flow", "Sensor"]
        );
    }

    #[test]
    fn test_empty_trait_only_blocks_longer_suffixes() {
        let mut graph = water_graph();
        graph.relate("WaterPoint", Relation::HasTrait, "WaterPointSection");
        let mut gen = generator();
        let spec = SynthesisSpec::new(
            "WaterPoint",
            ["WaterPointSection", "WaterType", "WaterPointQuantity"],
        );
        let report = gen.generate(&mut graph, &[spec]);

        assert_eq!(report.classes, 14);
        assert!(gen.generated().iter().all(|c| c.tuple.len() <= 3));
        assert_eq!(graph.diagnostics().with_code(DiagnosticCode::UnresolvedDimension).count(), 1);
    }

    #[test]
    fn test_empty_trait_mid_list_blocks_everything_above_it() {
        let mut graph = water_graph();
        graph.relate("WaterPoint", Relation::HasTrait, "WaterPointSection");
        let mut gen = generator();
        let spec = SynthesisSpec::new(
            "WaterPoint",
            ["WaterType", "WaterPointSection", "WaterPointQuantity"],
        );
        let report = gen.generate(&mut graph, &[spec]);

        // [PointType] and [Quantity, PointType] survive: 2 + 2*2
        assert_eq!(report.classes, 6);
        assert_eq!(report.specs[0].dimensions[1].candidates, Vec::<String>::new());
        assert!(gen.generated().iter().all(|c| c.tuple.len() <= 2));
        assert!(!gen.generated().iter().any(|c| c.tuple.iter().any(|t| t == "Chilled")));
        assert_eq!(find(&gen, "TempCmd").parent, "Cmd");

        let unresolved: Vec<_> =
            graph.diagnostics().with_code(DiagnosticCode::UnresolvedDimension).collect();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].subject, "WaterPointSection");
    }

    #[test]
    fn test_parents_span_specs() {
        let mut graph = water_graph();
        graph.declare("WaterMeter", EntityKind::Kind);
        graph.relate("WaterMeter", Relation::HasTrait, "WaterType");
        let mut gen = generator();
        gen.generate(
            &mut graph,
            &[
                SynthesisSpec::new("WaterPoint", ["WaterType", "WaterPointQuantity"]),
                SynthesisSpec::new("WaterMeter", ["WaterType", "Water", "Meter"]),
            ],
        );

        // "Sensor" from the second spec still finds nothing longer than itself
        let second_sensor = gen.generated().iter().filter(|c| c.name == "Sensor").nth(1).unwrap();
        assert_eq!(second_sensor.parent, "WaterMeter");
        assert_eq!(find(&gen, "MeterSensor").parent, "Sensor");
        assert_eq!(find(&gen, "ChilledWaterMeterSensor").parent, "WaterMeterSensor");
    }

    #[test]
    fn test_no_point_types_generates_nothing() {
        let mut graph = TaxonomyGraph::new();
        graph.declare("AirPoint", EntityKind::Kind);
        let mut gen = generator();
        let report = gen.generate(&mut graph, &[SynthesisSpec::new("AirPoint", ["Air"])]);

        assert_eq!(report.classes, 0);
        assert_eq!(graph.diagnostics().with_code(DiagnosticCode::EmptyPointTypes).count(), 1);
    }

    #[test]
    fn test_unknown_base_class_reported() {
        let mut graph = water_graph();
        let mut gen = generator();
        gen.generate(&mut graph, &[SynthesisSpec::new("WaterPt", ["Water"])]);

        let item = graph.diagnostics().with_code(DiagnosticCode::UnknownBaseClass).next().unwrap();
        assert_eq!(item.subject, "WaterPt");
        assert!(item.context.iter().any(|c| c.contains("WaterPoint")));
    }
}
