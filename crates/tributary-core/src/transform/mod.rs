//! Ordered, fallible rewriting of a pipeline document.
//!
//! A [`TransformChain`] is a fixed list of [`TransformStep`]s. Applying it
//! folds the document through every step in registration order and stops at
//! the first failure. The document is moved through the chain, so a failure
//! drops whatever the earlier steps produced: the caller gets either a fully
//! transformed document or an error naming the failing step.
//!
//! # Example
//!
//! ```
//! use tributary_core::transform::{self, TransformChain};
//! use tributary_core::PipelineConfig;
//!
//! let chain = TransformChain::builder()
//!     .step(transform::from_fn("noop", Ok))
//!     .build();
//!
//! let doc = PipelineConfig::default();
//! assert_eq!(chain.apply(doc.clone()).unwrap(), doc);
//! ```

mod environ;
mod image;
mod secrets;
mod validate;
mod workspace;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::document::PipelineConfig;
use crate::error::{PipelineError, Result, TransformError};

pub use environ::Environ;
pub use image::ImageTag;
pub use secrets::InjectSecrets;
pub use validate::Validate;
pub use workspace::DefaultWorkspace;

/// One named rewrite of the pipeline document.
///
/// Steps hold configuration only and must not keep per-document state, since
/// a single registered step serves every concurrent build.
pub trait TransformStep: Send + Sync {
    /// Name reported when the step fails.
    fn name(&self) -> &str;

    /// Produces the next document, or a failure.
    fn apply(&self, config: PipelineConfig) -> std::result::Result<PipelineConfig, TransformError>;
}

/// A step backed by a plain function.
pub struct FnStep<F> {
    name: String,
    f: F,
}

impl<F> TransformStep for FnStep<F>
where
    F: Fn(PipelineConfig) -> std::result::Result<PipelineConfig, TransformError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, config: PipelineConfig) -> std::result::Result<PipelineConfig, TransformError> {
        (self.f)(config)
    }
}

/// Wraps a function as a named transform step.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnStep<F>
where
    F: Fn(PipelineConfig) -> std::result::Result<PipelineConfig, TransformError> + Send + Sync,
{
    FnStep {
        name: name.into(),
        f,
    }
}

/// Applies `steps` to `config` in order, halting at the first failure.
///
/// An empty step list returns the document unchanged.
pub fn apply_transforms(
    config: PipelineConfig,
    steps: &[Arc<dyn TransformStep>],
) -> Result<PipelineConfig> {
    steps.iter().try_fold(config, |config, step| {
        debug!(step = step.name(), "Applying transform");
        step.apply(config).map_err(|cause| {
            warn!(step = step.name(), error = %cause, "Transform step failed");
            PipelineError::step_failed(step.name(), cause)
        })
    })
}

/// The process-wide ordered list of registered transform steps.
///
/// Cloning is cheap; clones share the same steps.
#[derive(Clone, Default)]
pub struct TransformChain {
    steps: Arc<[Arc<dyn TransformStep>]>,
}

impl TransformChain {
    /// Creates a new builder for TransformChain.
    pub fn builder() -> TransformChainBuilder {
        TransformChainBuilder::default()
    }

    /// Runs the chain over one document.
    pub fn apply(&self, config: PipelineConfig) -> Result<PipelineConfig> {
        apply_transforms(config, &self.steps)
    }

    /// Returns the registered step names, in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Returns the number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no steps are registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformChain")
            .field("steps", &self.step_names())
            .finish()
    }
}

/// Builder for TransformChain.
#[derive(Default)]
pub struct TransformChainBuilder {
    steps: Vec<Arc<dyn TransformStep>>,
}

impl TransformChainBuilder {
    /// Appends a step.
    pub fn step(mut self, step: impl TransformStep + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Freezes the registration order.
    pub fn build(self) -> TransformChain {
        TransformChain {
            steps: self.steps.into(),
        }
    }
}
