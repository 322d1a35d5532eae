#![allow(dead_code)]
use tributary_core::PipelineConfig;

/// Parses a YAML fixture.
/// Panics if the YAML is invalid (intended for tests).
pub fn config_from_yaml(yaml: &str) -> PipelineConfig {
    PipelineConfig::from_yaml(yaml).expect("Failed to parse test pipeline")
}

/// A two-step pipeline with one service and one requested secret.
pub fn sample_config() -> PipelineConfig {
    config_from_yaml(
        r#"
pipeline:
  test:
    image: Golang
    commands:
      - go test ./...
  publish:
    image: plugins/docker:18
    secrets: [docker_password]
services:
  cache:
    image: redis
"#,
    )
}
