//! Image name normalization.

use super::TransformStep;
use crate::document::PipelineConfig;
use crate::error::TransformError;

/// Lower-cases image names and pins untagged images to `latest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTag;

impl TransformStep for ImageTag {
    fn name(&self) -> &str {
        "image"
    }

    fn apply(&self, mut config: PipelineConfig) -> Result<PipelineConfig, TransformError> {
        for (_, container) in config.containers_mut() {
            if !container.image.trim().is_empty() {
                container.image = normalize(&container.image);
            }
        }
        Ok(config)
    }
}

fn normalize(image: &str) -> String {
    let image = image.trim().to_lowercase();
    if image.contains('@') {
        return image;
    }
    // A colon before the last slash belongs to a registry port, not a tag.
    let name = image.rsplit('/').next().unwrap_or(&image);
    if name.contains(':') {
        image
    } else {
        format!("{}:latest", image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Container;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("golang"), "golang:latest");
        assert_eq!(normalize("golang:1.22"), "golang:1.22");
        assert_eq!(normalize("Plugins/Docker"), "plugins/docker:latest");
        assert_eq!(normalize("registry:5000/team/app"), "registry:5000/team/app:latest");
        assert_eq!(normalize("registry:5000/team/app:v2"), "registry:5000/team/app:v2");
        assert_eq!(normalize("alpine@sha256:abcd"), "alpine@sha256:abcd");
    }

    #[test]
    fn test_apply_skips_empty_images() {
        let mut config = PipelineConfig::default();
        config.pipeline.insert("build".into(), Container::new("rust"));
        config.pipeline.insert("broken".into(), Container::default());

        let config = ImageTag.apply(config).unwrap();

        assert_eq!(config.pipeline["build"].image, "rust:latest");
        assert_eq!(config.pipeline["broken"].image, "");
    }
}
