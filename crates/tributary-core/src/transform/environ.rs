//! Default environment injection.

use indexmap::IndexMap;

use super::TransformStep;
use crate::document::PipelineConfig;
use crate::error::TransformError;

/// Adds default environment variables to every container.
///
/// Keys already set by the document win over the defaults.
#[derive(Debug, Clone, Default)]
pub struct Environ {
    vars: IndexMap<String, String>,
}

impl Environ {
    /// Creates the step from the default variables.
    pub fn new(vars: IndexMap<String, String>) -> Self {
        Self { vars }
    }
}

impl TransformStep for Environ {
    fn name(&self) -> &str {
        "addDefaultEnv"
    }

    fn apply(&self, mut config: PipelineConfig) -> Result<PipelineConfig, TransformError> {
        if self.vars.is_empty() {
            return Ok(config);
        }
        for (_, container) in config.containers_mut() {
            for (key, value) in &self.vars {
                container
                    .environment
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        Ok(config)
    }
}
