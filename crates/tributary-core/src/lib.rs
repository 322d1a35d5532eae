//! # Tributary Core
//!
//! The pipeline-configuration document submitted by a repository, and the
//! transform chain that rewrites it before execution.
//!
//! ## Example
//!
//! ```
//! use tributary_core::transform::{Environ, ImageTag, TransformChain, Validate};
//! use tributary_core::PipelineConfig;
//!
//! let chain = TransformChain::builder()
//!     .step(Environ::default())
//!     .step(ImageTag)
//!     .step(Validate::default())
//!     .build();
//!
//! let doc = PipelineConfig::from_yaml("pipeline:\n  build:\n    image: rust\n").unwrap();
//! let doc = chain.apply(doc).unwrap();
//! assert_eq!(doc.pipeline["build"].image, "rust:latest");
//! ```

pub mod document;
pub mod error;
pub mod transform;

pub use document::{Container, PipelineConfig, Workspace};
pub use error::{PipelineError, Result, TransformError};
pub use transform::{TransformChain, TransformStep, apply_transforms};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
