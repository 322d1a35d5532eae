//! Default workspace.

use super::TransformStep;
use crate::document::{PipelineConfig, Workspace};
use crate::error::TransformError;

/// Fills in the workspace base and path when the document leaves them out.
#[derive(Debug, Clone)]
pub struct DefaultWorkspace {
    base: String,
    path: String,
}

impl DefaultWorkspace {
    /// Creates the step with the given defaults.
    pub fn new(base: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            path: path.into(),
        }
    }
}

impl Default for DefaultWorkspace {
    fn default() -> Self {
        Self::new("/tributary", "src")
    }
}

impl TransformStep for DefaultWorkspace {
    fn name(&self) -> &str {
        "workspace"
    }

    fn apply(&self, mut config: PipelineConfig) -> Result<PipelineConfig, TransformError> {
        let workspace = config.workspace.get_or_insert_with(Workspace::default);
        if workspace.base.is_empty() {
            workspace.base = self.base.clone();
        }
        if workspace.path.is_empty() {
            workspace.path = self.path.clone();
        }
        Ok(config)
    }
}
