//! Server settings.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. An optional file named by `TRIBUTARY_CONFIG` (YAML, TOML or JSON)
//! 3. Environment variables prefixed with `TRIBUTARY_`, using `__` between
//!    nested keys, e.g. `TRIBUTARY_REMOTE__GITHUB__ENABLED=true`
//!
//! They are read once at startup.

use std::fmt;
use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tributary_remote::RemoteSettings;

/// Names the optional settings file.
pub const CONFIG_ENV: &str = "TRIBUTARY_CONFIG";

/// Prefix shared by all settings environment variables.
pub const ENV_PREFIX: &str = "TRIBUTARY";

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listener and public address.
    pub server: ServerSettings,
    /// Provider sections, one of which must be enabled.
    pub remote: RemoteSettings,
    /// Pipeline document handling.
    pub pipeline: PipelineSettings,
}

impl Settings {
    /// Loads settings from the file named by `TRIBUTARY_CONFIG`, if set, and
    /// the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        Self::from_sources(file.as_deref(), Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads settings from an optional file and an environment source.
    ///
    /// The environment source is given the `TRIBUTARY_` prefix and `__`
    /// nesting conventions here, so tests can pass one built over a fixed
    /// map with [`Environment::source`].
    pub fn from_sources(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(env.prefix_separator("_").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Externally reachable base URL, used for webhook and OAuth callbacks.
    pub public_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            public_url: "http://localhost:8000".to_string(),
        }
    }
}

impl ServerSettings {
    /// Returns the address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Returns `public_url` joined with `path`.
    pub fn link(&self, path: &str) -> String {
        format!("{}{}", self.public_url.trim_end_matches('/'), path)
    }
}

/// How pipeline documents are located and transformed.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Path of the pipeline document inside repositories.
    pub config_path: String,
    /// Environment added to every container.
    pub environment: IndexMap<String, String>,
    /// Named secrets containers may request.
    pub secrets: IndexMap<String, String>,
    /// Allow privileged containers.
    pub trusted: bool,
    /// Default workspace base directory.
    pub workspace_base: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            config_path: ".tributary.yml".to_string(),
            environment: IndexMap::new(),
            secrets: IndexMap::new(),
            trusted: false,
            workspace_base: "/tributary".to_string(),
        }
    }
}

impl fmt::Debug for PipelineSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineSettings")
            .field("config_path", &self.config_path)
            .field("environment", &self.environment)
            .field("secrets", &self.secrets.keys().collect::<Vec<_>>())
            .field("trusted", &self.trusted)
            .field("workspace_base", &self.workspace_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.pipeline.config_path, ".tributary.yml");
        assert_eq!(settings.pipeline.workspace_base, "/tributary");
        assert!(!settings.pipeline.trusted);
        assert!(settings.remote.enabled_kinds().is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerSettings {
            host: "127.0.0.1".into(),
            port: 9000,
            ..ServerSettings::default()
        };
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn test_link_trims_trailing_slash() {
        let server = ServerSettings {
            public_url: "https://ci.example.com/".into(),
            ..ServerSettings::default()
        };
        assert_eq!(server.link("/hook"), "https://ci.example.com/hook");
    }

    #[test]
    fn test_debug_hides_secret_values() {
        let mut pipeline = PipelineSettings::default();
        pipeline
            .secrets
            .insert("docker_password".into(), "hunter2".into());

        let debug = format!("{:?}", pipeline);
        assert!(debug.contains("docker_password"));
        assert!(!debug.contains("hunter2"));
    }
}
