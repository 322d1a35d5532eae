//! Secret injection.

use indexmap::IndexMap;

use super::TransformStep;
use crate::document::PipelineConfig;
use crate::error::TransformError;

/// Resolves the secrets each container asks for into environment variables.
///
/// A secret named `docker_password` becomes `DOCKER_PASSWORD`. Requesting a
/// name the store does not hold fails the step.
#[derive(Clone, Default)]
pub struct InjectSecrets {
    store: IndexMap<String, String>,
}

impl InjectSecrets {
    /// Creates the step over a fixed secret store.
    pub fn new(store: IndexMap<String, String>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for InjectSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectSecrets")
            .field("names", &self.store.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TransformStep for InjectSecrets {
    fn name(&self) -> &str {
        "injectSecret"
    }

    fn apply(&self, mut config: PipelineConfig) -> Result<PipelineConfig, TransformError> {
        for (_, container) in config.containers_mut() {
            for name in &container.secrets {
                let value = self
                    .store
                    .get(name)
                    .ok_or_else(|| TransformError::secret_not_found(name))?;
                container
                    .environment
                    .insert(name.to_uppercase(), value.clone());
            }
        }
        Ok(config)
    }
}
