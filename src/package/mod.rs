//! Release bundle assembly
//!
//! Each assembler resolves the three artifacts for its platform, validates
//! credentials, cleans the working tree, fetches the artifacts one after the
//! other and finally archives the fixed manifest into a single package.
//!
//! ## Module Organization
//!
//! - `platform` - OS/architecture detection and labels
//! - `artifact` - artifact descriptors and extraction strategy
//! - `fetch` - idempotent download-and-extract
//! - `manifest` - the fixed package contents

mod artifact;
mod fetch;
mod manifest;
mod platform;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

pub use artifact::{ArtifactDescriptor, CAMUNDA, CONNECTORS, ELASTICSEARCH, Extraction};
pub use fetch::{FetchOutcome, fetch};
pub use manifest::Manifest;
pub use platform::{Arch, Platform, TargetOs};

use crate::archive::{self, Downloader};
use crate::clean::clean;
use crate::config::{PackagerConfig, SourceHosts};
use crate::credentials::CredentialSource;
use crate::error::{BoxError, PackageError, Result};

/// Versions of everything that goes into one bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersions {
    pub camunda: String,
    pub elasticsearch: String,
    pub connectors: String,
    pub release_tag: String,
}

impl ReleaseVersions {
    pub fn from_config(config: &PackagerConfig) -> Self {
        Self {
            camunda: config.camunda_version.clone(),
            elasticsearch: config.elasticsearch_version.clone(),
            connectors: config.connectors_version.clone(),
            release_tag: config.release_tag().to_string(),
        }
    }
}

/// Inputs of a packaging run. Nothing is read from process-wide state.
#[derive(Debug, Clone)]
pub struct PackageRequest {
    /// Working tree holding the launcher files; artifacts land here too
    pub base_dir: PathBuf,
    pub versions: ReleaseVersions,
    pub hosts: SourceHosts,
    pub credentials: CredentialSource,
}

/// File name of the release package, e.g. `camunda8-run-8.5.0-linux-x86_64.tar.gz`
pub fn package_name(camunda_version: &str, platform: &Platform) -> String {
    format!(
        "camunda8-run-{camunda_version}-{platform}.{}",
        platform.archive_extension()
    )
}

/// Build the package for `platform`, dispatching to the matching assembler
pub async fn package<D: Downloader>(
    downloader: &D,
    request: &PackageRequest,
    platform: Platform,
) -> Result<PathBuf> {
    if platform.is_windows() {
        package_windows(downloader, request).await
    } else {
        package_unix(downloader, request, platform).await
    }
}

/// Build `camunda8-run-<version>-windows-x86_64.zip`
pub async fn package_windows<D: Downloader>(
    downloader: &D,
    request: &PackageRequest,
) -> Result<PathBuf> {
    assemble(downloader, request, Platform::new(TargetOs::Windows, Arch::X86_64)).await
}

/// Build `camunda8-run-<version>-<os>-<arch>.tar.gz`
pub async fn package_unix<D: Downloader>(
    downloader: &D,
    request: &PackageRequest,
    platform: Platform,
) -> Result<PathBuf> {
    if platform.is_windows() {
        return Err(PackageError::UnsupportedOs(platform.os.label().to_string()));
    }
    assemble(downloader, request, platform).await
}

async fn assemble<D: Downloader>(
    downloader: &D,
    request: &PackageRequest,
    platform: Platform,
) -> Result<PathBuf> {
    let versions = &request.versions;
    let hosts = &request.hosts;

    let elasticsearch =
        ArtifactDescriptor::elasticsearch(hosts, &versions.elasticsearch, &platform);
    let camunda = ArtifactDescriptor::camunda(
        hosts,
        &versions.camunda,
        &versions.release_tag,
        &platform,
        request.credentials.release_token(),
    );
    // Fail before touching the network or the working tree
    let connectors = ArtifactDescriptor::connectors(
        hosts,
        &versions.connectors,
        request.credentials.artifact_repository()?,
    );

    let target = if platform.is_windows() { "windows" } else { "unix" };
    build(downloader, request, platform, [elasticsearch, camunda, connectors])
        .await
        .map_err(|e| PackageError::assemble(target, e))
}

async fn build<D: Downloader>(
    downloader: &D,
    request: &PackageRequest,
    platform: Platform,
    artifacts: [ArtifactDescriptor; 3],
) -> Result<PathBuf> {
    let versions = &request.versions;

    let base_dir = fs::canonicalize(&request.base_dir)
        .map_err(|e| PackageError::io("failed to resolve working tree", &request.base_dir, e))?;

    info!(
        "Packaging Camunda {} for {} in {}",
        versions.camunda,
        platform,
        base_dir.display()
    );
    clean(&base_dir, &versions.camunda, &versions.elasticsearch);

    for artifact in &artifacts {
        let outcome = fetch(downloader, artifact, &base_dir)
            .await
            .map_err(|e| PackageError::fetch(artifact.name, e))?;
        debug!("{}: {:?}", artifact.name, outcome);
    }

    let manifest = Manifest::new(
        platform.os,
        &versions.camunda,
        &versions.elasticsearch,
        &versions.connectors,
    );
    if let Some(missing) = manifest.entries().iter().find(|e| !base_dir.join(e).exists()) {
        return Err(PackageError::MissingManifestEntry {
            path: base_dir.join(missing),
        });
    }

    let (root, tree_name) = match (base_dir.parent(), base_dir.file_name()) {
        (Some(root), Some(name)) => (root.to_path_buf(), PathBuf::from(name)),
        _ => {
            return Err(PackageError::io(
                "working tree has no parent directory",
                &base_dir,
                std::io::ErrorKind::InvalidInput.into(),
            ));
        }
    };

    let output = base_dir.join(package_name(&versions.camunda, &platform));
    let entries = manifest.prefixed(&tree_name);
    info!("Writing {} ({} entries)", output.display(), entries.len());

    let task_output = output.clone();
    let written = tokio::task::spawn_blocking(move || {
        write_package(&platform, &root, &entries, &task_output)
    })
    .await
    .map_err(|e| Box::new(e) as BoxError)
    .and_then(|result| result);

    if let Err(source) = written {
        // Never leave a truncated package behind
        let _ = fs::remove_file(&output);
        return Err(PackageError::Archive { path: output, source });
    }

    info!("Created {}", output.display());
    Ok(output)
}

fn write_package(
    platform: &Platform,
    root: &Path,
    entries: &[PathBuf],
    output: &Path,
) -> Result<(), BoxError> {
    if platform.is_windows() {
        return archive::create_zip(root, entries, output);
    }
    let file = fs::File::create(output)?;
    let file = archive::create_tar_gz(root, entries, file)?;
    file.sync_all()?;
    Ok(())
}
