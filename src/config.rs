//! Configuration management for taxonomy synthesis
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (synth.toml)
//! - Environment variables (SYNTH__*)
//!
//! ## Example config file (synth.toml):
//! ```toml
//! [schema]
//! path = "defs.json"
//! sections = ["phIoT"]
//! marker_kind = "ph::Marker"
//!
//! [generation]
//! point_type_class = "PointType"
//! separator = ""
//! parent_policy = "name-suffix"
//!
//! [[generation.specs]]
//! base = "WaterPoint"
//! dimensions = ["WaterPointSection", "WaterType", "Water", "WaterPointQuantity"]
//!
//! [export]
//! format = "ntriples"
//! output = "triples.nt"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::synth::{ParentPolicyKind, SynthesisSpec};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Schema input settings
    #[serde(default)]
    pub schema: SchemaSettings,

    /// Class generation settings
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Export settings
    #[serde(default)]
    pub export: ExportSettings,
}

/// Schema input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSettings {
    /// Path to the definitions document
    #[serde(default = "default_schema_path")]
    pub path: PathBuf,

    /// Sections to load; empty loads every section
    #[serde(default)]
    pub sections: Vec<String>,

    /// Tag discriminator that marks ontology tags
    #[serde(default = "default_marker_kind")]
    pub marker_kind: String,
}

/// Class generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Class whose tags form the implicit point-type dimension
    #[serde(default = "default_point_type_class")]
    pub point_type_class: String,

    /// Joined between tags in generated names; empty concatenates
    #[serde(default)]
    pub separator: String,

    /// How parents among generated classes are chosen
    #[serde(default)]
    pub parent_policy: ParentPolicyKind,

    /// Synthesis specs, run in order
    #[serde(default = "default_specs")]
    pub specs: Vec<SynthesisSpec>,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub format: ExportFormat,

    /// Output file; stdout when unset
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Namespace for classes, tags and traits
    #[serde(default = "default_class_namespace")]
    pub class_namespace: String,

    /// Namespace for the has-tag / has-trait / has-definition relations
    #[serde(default = "default_frame_namespace")]
    pub frame_namespace: String,
}

/// Graph export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Ntriples,
    Dot,
}

// Default value functions
fn default_schema_path() -> PathBuf {
    PathBuf::from("defs.json")
}

fn default_marker_kind() -> String {
    "ph::Marker".to_string()
}

fn default_point_type_class() -> String {
    "PointType".to_string()
}

fn default_class_namespace() -> String {
    "https://brickschema.org/schema/1.0.3/Brick#".to_string()
}

fn default_frame_namespace() -> String {
    "https://brickschema.org/schema/1.0.3/BrickFrame#".to_string()
}

/// The stock building-automation specs
pub fn default_specs() -> Vec<SynthesisSpec> {
    vec![
        SynthesisSpec::new(
            "WaterPoint",
            ["WaterPointSection", "WaterType", "Water", "WaterPointQuantity"],
        ),
        SynthesisSpec::new("AirPoint", ["AirPointSection", "Air", "AirPointQuantity"]),
        SynthesisSpec::new("ElecPoint", ["Elec", "ElecPointQuantity"]),
        SynthesisSpec::new("Meter", ["Meter", "MeterScope"]),
        SynthesisSpec::new("WaterMeter", ["WaterType", "Water", "Meter"]),
        SynthesisSpec::new("WaterTank", ["WaterType", "Water", "Tank"]),
    ]
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            path: default_schema_path(),
            sections: Vec::new(),
            marker_kind: default_marker_kind(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            point_type_class: default_point_type_class(),
            separator: String::new(),
            parent_policy: ParentPolicyKind::default(),
            specs: default_specs(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            output: None,
            class_namespace: default_class_namespace(),
            frame_namespace: default_frame_namespace(),
        }
    }
}

impl SynthConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, with `config_path` taking precedence over the
    /// default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["synth.toml", ".synth.toml", "config/synth.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("org", "haystack", "brick-synth") {
            let xdg_config = config_dir.config_dir().join("synth.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (SYNTH__*)
        builder = builder.add_source(
            Environment::with_prefix("SYNTH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Schema path resolved against the working directory
    pub fn schema_path(&self) -> PathBuf {
        if self.schema.path.is_absolute() {
            self.schema.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.schema.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SynthConfig::default();
        assert_eq!(config.schema.marker_kind, "ph::Marker");
        assert_eq!(config.generation.point_type_class, "PointType");
        assert_eq!(config.generation.specs.len(), 6);
        assert_eq!(config.generation.specs[0].base, "WaterPoint");
        assert_eq!(config.export.format, ExportFormat::Json);
    }

    #[test]
    fn test_serialize_config() {
        let config = SynthConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[schema]"));
        assert!(toml_str.contains("[generation]"));
        assert!(toml_str.contains("[[generation.specs]]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[schema]
path = "defs/phiot.json"
sections = ["phIoT"]

[generation]
separator = "_"
parent_policy = "tag-subsequence"

[[generation.specs]]
base = "AirPoint"
dimensions = ["Air", "AirPointQuantity"]

[export]
format = "ntriples"
"#,
        )
        .unwrap();

        let config = SynthConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.schema.sections, vec!["phIoT".to_string()]);
        assert_eq!(config.generation.separator, "_");
        assert_eq!(config.generation.parent_policy, ParentPolicyKind::TagSubsequence);
        assert_eq!(
            config.generation.specs,
            vec![SynthesisSpec::new("AirPoint", ["Air", "AirPointQuantity"])]
        );
        assert_eq!(config.generation.point_type_class, "PointType");
        assert_eq!(config.export.format, ExportFormat::Ntriples);
    }

    #[test]
    fn test_save_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = SynthConfig::default();
        config.generation.specs.truncate(1);
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = SynthConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.generation.specs, config.generation.specs);
    }
}
