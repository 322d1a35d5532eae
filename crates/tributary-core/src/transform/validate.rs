//! Structural validation.

use super::TransformStep;
use crate::document::PipelineConfig;
use crate::error::TransformError;

/// Rejects documents the executor cannot run.
///
/// Checks that at least one step exists, that every container names an
/// image, and that privileged containers only appear in trusted
/// deployments. The document itself is never modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validate {
    trusted: bool,
}

impl Validate {
    /// Creates the step; `trusted` permits privileged containers.
    pub fn new(trusted: bool) -> Self {
        Self { trusted }
    }
}

impl TransformStep for Validate {
    fn name(&self) -> &str {
        "validateSchema"
    }

    fn apply(&self, config: PipelineConfig) -> Result<PipelineConfig, TransformError> {
        if config.pipeline.is_empty() {
            return Err(TransformError::validation(
                "pipeline",
                "at least one step is required",
            ));
        }
        for (name, container) in config.containers() {
            if container.image.trim().is_empty() {
                return Err(TransformError::validation(
                    format!("{}.image", name),
                    "image is required",
                ));
            }
            if container.privileged && !self.trusted {
                return Err(TransformError::validation(
                    format!("{}.privileged", name),
                    "privileged containers require a trusted deployment",
                ));
            }
        }
        Ok(config)
    }
}
