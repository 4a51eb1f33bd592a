//! Idempotent download-and-extract of a single artifact

use std::path::Path;

use log::info;

use crate::archive::Downloader;
use crate::error::{PackageError, Result};

use super::artifact::{ArtifactDescriptor, Extraction};

/// What `fetch` did after the download succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Extracted,
    /// The extraction directory was already present; extraction skipped
    AlreadyExtracted,
    /// The artifact is used without extraction
    NotExtracted,
}

/// Download `artifact` into `base_dir`, then extract it unless its
/// extraction directory already exists.
///
/// The download always happens, even if the archive is already on disk.
/// Only extraction is conditional.
pub async fn fetch<D: Downloader>(
    downloader: &D,
    artifact: &ArtifactDescriptor,
    base_dir: &Path,
) -> Result<FetchOutcome> {
    let archive = base_dir.join(&artifact.file_name);

    info!("Downloading {} {} from {}", artifact.name, artifact.version, artifact.url);
    downloader
        .download(&artifact.url, &archive, &artifact.credential)
        .await
        .map_err(|source| PackageError::Download {
            url: artifact.url.clone(),
            source,
        })?;

    if artifact.extraction == Extraction::None {
        return Ok(FetchOutcome::NotExtracted);
    }

    let extract_dir = base_dir.join(&artifact.extract_dir);
    let exists = tokio::fs::try_exists(&extract_dir)
        .await
        .map_err(|e| PackageError::io("failed to inspect extraction directory", &extract_dir, e))?;
    if exists {
        info!("{} already present, skipping extraction", extract_dir.display());
        return Ok(FetchOutcome::AlreadyExtracted);
    }

    info!("Extracting {} into {}", archive.display(), base_dir.display());
    let extraction = artifact.extraction;
    let dest = base_dir.to_path_buf();
    let task_archive = archive.clone();
    tokio::task::spawn_blocking(move || extraction.extract(&task_archive, &dest))
        .await
        .map_err(|e| PackageError::Extract {
            archive: archive.clone(),
            source: Box::new(e),
        })?
        .map_err(|source| PackageError::Extract { archive, source })?;

    Ok(FetchOutcome::Extracted)
}
