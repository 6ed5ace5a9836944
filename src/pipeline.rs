//! One synthesis run: load → populate → generate.
//!
//! The run is synchronous and owns its graph; nothing is shared between runs.

use crate::config::{GenerationSettings, SynthConfig};
use crate::error::Result;
use crate::graph::{populate, Diagnostics, TaxonomyGraph};
use crate::schema::SchemaModel;
use crate::synth::{ClassGenerator, GeneratedClass, GenerationReport};

/// Everything a run produced
#[derive(Debug)]
pub struct SynthesisRun {
    pub graph: TaxonomyGraph,
    pub classes: Vec<GeneratedClass>,
    pub report: GenerationReport,
    pub diagnostics: Diagnostics,
}

impl SynthesisRun {
    /// Fingerprint of the final fact log
    pub fn fingerprint(&self) -> String {
        self.graph.fingerprint()
    }
}

/// Load the configured schema and run generation over it
pub fn run(config: &SynthConfig) -> Result<SynthesisRun> {
    let mut diagnostics = Diagnostics::new();
    let model = SchemaModel::load_from(&config.schema_path(), &config.schema, &mut diagnostics)?;
    let mut run = run_model(&model, &config.generation);
    diagnostics.merge(std::mem::take(&mut run.diagnostics));
    run.diagnostics = diagnostics;
    Ok(run)
}

/// Run generation over an already loaded model
pub fn run_model(model: &SchemaModel, settings: &GenerationSettings) -> SynthesisRun {
    let mut graph = TaxonomyGraph::new();
    populate(&mut graph, model);

    let mut generator = ClassGenerator::new(settings);
    let report = generator.generate(&mut graph, &settings.specs);
    let diagnostics = graph.take_diagnostics();

    tracing::info!(
        facts = graph.fact_count(),
        classes = report.classes,
        warnings = diagnostics.warning_count(),
        "synthesis run complete"
    );

    SynthesisRun {
        graph,
        classes: generator.into_generated(),
        report,
        diagnostics,
    }
}
