//! Brick Class Synthesis CLI
//!
//! Loads Haystack definitions, generates the class lattice and exports it.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use haystack_brick::config::ExportFormat;
use haystack_brick::synth::ParentPolicyKind;
use haystack_brick::{export, pipeline, GeneratedClass, SynthConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brick-synth")]
#[command(about = "Generate a Brick class lattice from Haystack definitions")]
struct Cli {
    /// Config file (defaults to synth.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Definitions document (overrides config)
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Section to load; repeatable (overrides config)
    #[arg(long = "section", global = true)]
    sections: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate classes and export the graph
    Generate {
        /// Output format: json, ntriples or dot
        #[arg(short, long)]
        format: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Parent policy: name-suffix or tag-subsequence
        #[arg(long)]
        policy: Option<String>,

        /// Separator between tags in generated names
        #[arg(long)]
        separator: Option<String>,
    },

    /// List generated classes with their inferred parents
    Classes {
        /// Only classes of this base class
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Show or write configuration
    Config {
        /// Write the effective configuration to this file instead of printing it
        #[arg(long)]
        save: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        SynthConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(schema) = cli.schema {
        config.schema.path = schema;
    }
    if !cli.sections.is_empty() {
        config.schema.sections = cli.sections;
    }

    match cli.command {
        Commands::Generate { format, output, policy, separator } => {
            if let Some(format) = format {
                config.export.format = parse_format(&format)?;
            }
            if output.is_some() {
                config.export.output = output;
            }
            if let Some(policy) = policy {
                config.generation.parent_policy = parse_policy(&policy)?;
            }
            if let Some(separator) = separator {
                config.generation.separator = separator;
            }

            let run = pipeline::run(&config)
                .with_context(|| format!("synthesizing from {}", config.schema.path.display()))?;

            eprintln!("📊 Synthesis Summary:");
            eprintln!("  Point types: {}", run.report.point_types.join(", "));
            for spec in &run.report.specs {
                eprintln!("  {} → {} classes", spec.base, spec.classes);
            }
            eprintln!("  Generated classes: {}", run.report.classes);
            eprintln!("  Graph has {} facts", run.graph.fact_count());
            if !run.diagnostics.is_empty() {
                eprintln!();
                eprint!("{}", run.diagnostics);
            }

            export::write(&run.graph, &config.export)?;
        }

        Commands::Classes { base } => {
            let run = pipeline::run(&config)?;
            let wanted = |c: &&GeneratedClass| base.as_deref().map_or(true, |b| c.base == b);
            for class in run.classes.iter().filter(wanted) {
                println!("{} ⊂ {}  [{}]", class.name, class.parent, class.tuple.join(", "));
            }
        }

        Commands::Config { save } => match save {
            Some(path) => {
                config.save(&path)?;
                println!("✅ Configuration written to {}", path);
            }
            None => print!("{}", toml::to_string_pretty(&config)?),
        },
    }

    Ok(())
}

fn parse_format(value: &str) -> anyhow::Result<ExportFormat> {
    match value {
        "json" => Ok(ExportFormat::Json),
        "ntriples" | "nt" => Ok(ExportFormat::Ntriples),
        "dot" => Ok(ExportFormat::Dot),
        other => anyhow::bail!("Invalid format '{}'. Use 'json', 'ntriples' or 'dot'", other),
    }
}

fn parse_policy(value: &str) -> anyhow::Result<ParentPolicyKind> {
    match value {
        "name-suffix" => Ok(ParentPolicyKind::NameSuffix),
        "tag-subsequence" => Ok(ParentPolicyKind::TagSubsequence),
        other => {
            anyhow::bail!("Invalid policy '{}'. Use 'name-suffix' or 'tag-subsequence'", other)
        }
    }
}
