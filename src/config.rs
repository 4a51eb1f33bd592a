use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top‑level packager configuration. Every field has a default, so an empty
/// (or absent) file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagerConfig {
    pub camunda_version: String,
    pub elasticsearch_version: String,
    pub connectors_version: String,
    /// Release tag of the workflow-engine distribution (defaults to the version)
    pub release_tag: Option<String>,
    /// Working tree holding the launcher files (defaults to the current directory)
    pub base_dir: Option<PathBuf>,
    pub hosts: SourceHosts,
    pub credentials: CredentialVars,
}

/// URL prefixes the three artifacts are fetched from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceHosts {
    pub elasticsearch: String,
    pub camunda_releases: String,
    pub connectors_repository: String,
}

/// Names of the environment variables holding download credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialVars {
    pub token: String,
    pub username: String,
    pub password: String,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            camunda_version: "8.5.0".to_string(),
            elasticsearch_version: "8.13.4".to_string(),
            connectors_version: "8.5.0".to_string(),
            release_tag: None,
            base_dir: None,
            hosts: SourceHosts::default(),
            credentials: CredentialVars::default(),
        }
    }
}

impl Default for SourceHosts {
    fn default() -> Self {
        Self {
            elasticsearch: "https://artifacts.elastic.co/downloads/elasticsearch".to_string(),
            camunda_releases: "https://github.com/camunda/camunda/releases/download".to_string(),
            connectors_repository: "https://repository.nexus.camunda.cloud/content/groups/internal/io/camunda/connector/connector-runtime-bundle".to_string(),
        }
    }
}

impl Default for CredentialVars {
    fn default() -> Self {
        Self {
            token: "GH_TOKEN".to_string(),
            username: "JAVA_ARTIFACTS_USER".to_string(),
            password: "JAVA_ARTIFACTS_PASSWORD".to_string(),
        }
    }
}

impl PackagerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Release tag to download the workflow engine from
    pub fn release_tag(&self) -> &str {
        self.release_tag.as_deref().unwrap_or(&self.camunda_version)
    }
}
