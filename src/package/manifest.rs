//! Fixed list of working-tree paths bundled into the release package

use std::path::{Path, PathBuf};

use super::artifact::connectors_jar;
use super::platform::TargetOs;

/// Ordered package contents, relative to the working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<PathBuf>,
}

impl Manifest {
    pub fn new(
        os: TargetOs,
        camunda_version: &str,
        elasticsearch_version: &str,
        connectors_version: &str,
    ) -> Self {
        let launcher = if os == TargetOs::Windows { "c8run.exe" } else { "c8run" };

        let mut entries: Vec<PathBuf> = vec![
            "README.md".into(),
            "connectors-application.properties".into(),
            connectors_jar(connectors_version).into(),
            format!("elasticsearch-{elasticsearch_version}").into(),
            "custom_connectors".into(),
            "configuration".into(),
            launcher.into(),
            "endpoints.txt".into(),
            "log".into(),
            format!("camunda-zeebe-{camunda_version}").into(),
        ];

        let scripts: &[&str] = if os == TargetOs::Windows {
            &["package.bat"]
        } else {
            &["start.sh", "shutdown.sh", "package.sh"]
        };
        entries.extend(scripts.iter().map(PathBuf::from));

        Self { entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Entries as they appear inside the archive, under the working tree's name
    pub fn prefixed(&self, prefix: &Path) -> Vec<PathBuf> {
        self.entries.iter().map(|entry| prefix.join(entry)).collect()
    }
}
