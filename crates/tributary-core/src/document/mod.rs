//! Pipeline configuration document model.

mod config;

pub use config::{Container, PipelineConfig, Workspace};
