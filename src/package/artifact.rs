//! The three artifacts a release bundle is built from

use std::path::{Path, PathBuf};

use crate::archive;
use crate::config::SourceHosts;
use crate::credentials::Credential;
use crate::error::BoxError;

use super::platform::Platform;

pub const ELASTICSEARCH: &str = "elasticsearch";
pub const CAMUNDA: &str = "camunda";
pub const CONNECTORS: &str = "connectors";

/// How a downloaded artifact is materialized in the working tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Zip,
    TarGz,
    /// Used as-is (the connector runtime jar)
    None,
}

impl Extraction {
    fn for_platform(platform: &Platform) -> Self {
        if platform.is_windows() {
            Extraction::Zip
        } else {
            Extraction::TarGz
        }
    }

    /// Unpack `archive` into `dest`. A no-op for [`Extraction::None`].
    pub fn extract(self, archive: &Path, dest: &Path) -> Result<(), BoxError> {
        match self {
            Extraction::Zip => archive::extract_zip(archive, dest),
            Extraction::TarGz => archive::extract_tar_gz(archive, dest),
            Extraction::None => Ok(()),
        }
    }
}

/// Where an artifact comes from and where it ends up.
/// Paths are relative to the working tree.
#[derive(Debug, Clone)]
pub struct ArtifactDescriptor {
    pub name: &'static str,
    pub version: String,
    pub url: String,
    pub file_name: String,
    pub extract_dir: PathBuf,
    pub extraction: Extraction,
    pub credential: Credential,
}

impl ArtifactDescriptor {
    /// Elasticsearch distribution from the public artifact host (anonymous).
    /// Only an x86_64 build is published for Windows.
    pub fn elasticsearch(hosts: &SourceHosts, version: &str, platform: &Platform) -> Self {
        let ext = platform.archive_extension();
        let classifier = if platform.is_windows() {
            "windows-x86_64".to_string()
        } else {
            platform.to_string()
        };
        Self {
            name: ELASTICSEARCH,
            version: version.to_string(),
            url: format!(
                "{}/elasticsearch-{version}-{classifier}.{ext}",
                hosts.elasticsearch.trim_end_matches('/')
            ),
            file_name: format!("elasticsearch-{version}.{ext}"),
            extract_dir: PathBuf::from(format!("elasticsearch-{version}")),
            extraction: Extraction::for_platform(platform),
            credential: Credential::Anonymous,
        }
    }

    /// Camunda (Zeebe) distribution attached to a source-control release
    pub fn camunda(
        hosts: &SourceHosts,
        version: &str,
        release_tag: &str,
        platform: &Platform,
        credential: Credential,
    ) -> Self {
        let file_name = format!("camunda-zeebe-{version}.{}", platform.archive_extension());
        Self {
            name: CAMUNDA,
            version: version.to_string(),
            url: format!(
                "{}/{release_tag}/{file_name}",
                hosts.camunda_releases.trim_end_matches('/')
            ),
            file_name,
            extract_dir: PathBuf::from(format!("camunda-zeebe-{version}")),
            extraction: Extraction::for_platform(platform),
            credential,
        }
    }

    /// Connector runtime jar from the internal artifact repository
    pub fn connectors(hosts: &SourceHosts, version: &str, credential: Credential) -> Self {
        let file_name = connectors_jar(version);
        Self {
            name: CONNECTORS,
            version: version.to_string(),
            url: format!(
                "{}/{version}/{file_name}",
                hosts.connectors_repository.trim_end_matches('/')
            ),
            extract_dir: PathBuf::from(&file_name),
            file_name,
            extraction: Extraction::None,
            credential,
        }
    }
}

pub fn connectors_jar(version: &str) -> String {
    format!("connector-runtime-bundle-{version}-with-dependencies.jar")
}
