//! Pipeline configuration document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where the repository is checked out inside every container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Base directory shared by all containers.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base: String,

    /// Path of the checkout, relative to `base`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

/// A single container: either a pipeline step or a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Container image, e.g. `golang:1.22`.
    #[serde(default)]
    pub image: String,

    /// Shell commands run in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    /// Environment variables.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub environment: IndexMap<String, String>,

    /// Names of secrets to expose as environment variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<String>,

    /// Always pull the image before running.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pull: bool,

    /// Run with extended privileges.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub privileged: bool,
}

impl Container {
    /// Creates a container running the given image.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }
}

/// The parsed pipeline configuration submitted by a repository.
///
/// Step and service ordering follows the source document, which is why both
/// maps are [`IndexMap`]s.
///
/// # Example
///
/// ```
/// use tributary_core::PipelineConfig;
///
/// let config = PipelineConfig::from_yaml(
///     "pipeline:\n  build:\n    image: rust\n    commands:\n      - cargo test\n",
/// ).unwrap();
///
/// assert_eq!(config.pipeline["build"].image, "rust");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Checkout location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<Workspace>,

    /// Build steps, executed in order.
    #[serde(default)]
    pub pipeline: IndexMap<String, Container>,

    /// Long-running service containers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub services: IndexMap<String, Container>,
}

impl PipelineConfig {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses raw file content as fetched from a provider.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    /// Serializes the document back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Iterates over every container, steps first, then services.
    pub fn containers(&self) -> impl Iterator<Item = (&String, &Container)> {
        self.pipeline.iter().chain(self.services.iter())
    }

    /// Mutable variant of [`containers`](Self::containers).
    pub fn containers_mut(&mut self) -> impl Iterator<Item = (&String, &mut Container)> {
        self.pipeline.iter_mut().chain(self.services.iter_mut())
    }
}
