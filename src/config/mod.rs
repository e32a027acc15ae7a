//! Assistant configuration file and typed command options.
//!
//! Only the parts of `config.yml` the tooling cares about are modelled: the
//! assistant identifier, the language and the dialogue policies. Pipeline
//! components and any other keys are ignored.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{ASSISTANT_ID_DEFAULT_VALUE, DEPRECATED_POLICIES};
use crate::files::{optional_scalar, parse_yaml_document};

pub mod defaults;
pub mod options;

pub use defaults::*;
pub use options::*;

/// State of the `assistant_id` key in the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantId {
    /// Key missing or null.
    Missing,
    /// Key still holds the template placeholder.
    Placeholder,
    /// A real identifier.
    Unique(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub recipe: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    policies: Option<Vec<PolicyConfig>>,
}

/// One entry of the `policies` list.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    pub name: String,
    #[serde(default)]
    pub max_history: Option<usize>,
}

impl AssistantConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let document = parse_yaml_document(content)?;
        if document.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(document).context("Failed to parse config")
    }

    pub fn policies(&self) -> &[PolicyConfig] {
        self.policies.as_deref().unwrap_or_default()
    }

    pub fn assistant_id(&self) -> AssistantId {
        match self.assistant_id.as_deref() {
            None => AssistantId::Missing,
            Some(ASSISTANT_ID_DEFAULT_VALUE) => AssistantId::Placeholder,
            Some(id) => AssistantId::Unique(id.to_string()),
        }
    }

    /// Largest `max_history` across the configured policies.
    pub fn max_history(&self) -> Option<usize> {
        self.policies().iter().filter_map(|p| p.max_history).max()
    }

    /// Names of configured policies that are no longer supported.
    pub fn deprecated_policies(&self) -> Vec<&str> {
        self.policies()
            .iter()
            .map(|p| p.name.as_str())
            .filter(|name| DEPRECATED_POLICIES.contains(name))
            .collect()
    }
}
