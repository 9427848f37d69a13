//! Declarative layer schema from which type adapters are derived.
//!
//! ```toml
//! [[layers]]
//! name = "POS"
//! features = [{ name = "PosValue" }]
//!
//! [[layers]]
//! name = "Dependency"
//! kind = { relation = { source = "Governor", target = "Dependent" } }
//! features = [{ name = "DependencyType" }]
//!
//! [[layers]]
//! name = "SemPred"
//! features = [
//!     { name = "category" },
//!     { name = "arguments", link = { with_role = { role = "role", target = "target" } } },
//! ]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::TypeAdapter;
use crate::errors::DiffError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSchema {
    #[serde(default)]
    pub layers: Vec<LayerDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDef {
    pub name: String,
    #[serde(default)]
    pub kind: LayerKind,
    #[serde(default)]
    pub features: Vec<FeatureDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    #[default]
    Span,
    Relation {
        source: String,
        target: String,
    },
    Chain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDef {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub link: LinkMode,
}

fn default_enabled() -> bool {
    true
}

/// How a feature holds links, if at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Plain label feature
    #[default]
    None,
    /// Links carrying a role only
    Simple { role: String },
    WithRole { role: String, target: String },
}

impl LayerSchema {
    pub fn from_toml_str(source: &str) -> Result<Self, DiffError> {
        let schema: Self = toml::from_str(source)?;
        schema.check()?;
        Ok(schema)
    }

    /// Layer names must be unique.
    pub fn check(&self) -> Result<(), DiffError> {
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(layer.name.as_str()) {
                return Err(DiffError::Schema(format!(
                    "layer {:?} is declared twice",
                    layer.name
                )));
            }
        }
        Ok(())
    }

    pub fn layer(&self, name: &str) -> Option<&LayerDef> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// One adapter per span and relation layer.
    pub fn adapters(&self) -> Vec<TypeAdapter> {
        self.layers.iter().filter_map(LayerDef::adapter).collect()
    }
}

impl LayerDef {
    /// Adapter for this layer; chain layers have none.
    pub fn adapter(&self) -> Option<TypeAdapter> {
        let enabled = || self.features.iter().filter(|f| f.enabled);
        let labels = enabled()
            .filter(|f| f.link == LinkMode::None)
            .map(|f| f.name.clone());

        let mut adapter = match &self.kind {
            LayerKind::Span => TypeAdapter::span(&self.name, labels),
            LayerKind::Relation { source, target } => {
                TypeAdapter::arc(&self.name, source, target, labels)
            }
            LayerKind::Chain => {
                debug!(layer = %self.name, "skipping chain layer");
                return None;
            }
        };
        for feature in enabled() {
            adapter = match &feature.link {
                LinkMode::None => adapter,
                LinkMode::Simple { role } => adapter.with_role_slot(&feature.name, role),
                LinkMode::WithRole { role, target } => {
                    adapter.with_slot(&feature.name, role, target)
                }
            };
        }
        Some(adapter)
    }
}
