//! Application state.

use std::sync::Arc;

use tributary_core::TransformChain;
use tributary_core::transform::{DefaultWorkspace, Environ, ImageTag, InjectSecrets, Validate};

use crate::settings::{PipelineSettings, Settings};

/// Application state shared across all handlers.
///
/// The active remote is not part of the state; it is bound to each request
/// by [`RemoteLayer`](crate::middleware::RemoteLayer).
#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    transforms: TransformChain,
}

impl AppState {
    /// Creates the state with the built-in transform chain.
    pub fn new(settings: Settings) -> Self {
        let transforms = default_transforms(&settings.pipeline);
        Self::with_transforms(settings, transforms)
    }

    /// Creates the state with a custom transform chain.
    pub fn with_transforms(settings: Settings, transforms: TransformChain) -> Self {
        Self {
            settings: Arc::new(settings),
            transforms,
        }
    }

    /// Returns the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the transform chain applied to every pipeline document.
    pub fn transforms(&self) -> &TransformChain {
        &self.transforms
    }
}

/// Builds the built-in chain in registration order: `workspace`,
/// `addDefaultEnv`, `injectSecret`, `image`, `validateSchema`.
pub fn default_transforms(pipeline: &PipelineSettings) -> TransformChain {
    TransformChain::builder()
        .step(DefaultWorkspace::new(&pipeline.workspace_base, "src"))
        .step(Environ::new(pipeline.environment.clone()))
        .step(InjectSecrets::new(pipeline.secrets.clone()))
        .step(ImageTag)
        .step(Validate::new(pipeline.trusted))
        .build()
}
