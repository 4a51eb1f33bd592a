//! Error taxonomy for the packaging pipeline

use std::backtrace::Backtrace;
use std::path::PathBuf;
use std::sync::Arc;

/// Boxed error from an archive codec primitive (network, zip, tar, io).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while assembling a release bundle
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// Required environment variables are empty or unset. Every missing
    /// variable is listed so the operator can fix them in one go.
    #[error("{} env vars are not set", .missing.join(" and "))]
    MissingCredentials { missing: Vec<String> },

    #[error("unsupported operating system: {0}")]
    UnsupportedOs(String),

    #[error("unsupported CPU architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("failed to download file at url {url}")]
    Download {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to extract from archive at {}", .archive.display())]
    Extract {
        archive: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to create package {}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("package entry {} does not exist", .path.display())]
    MissingManifestEntry { path: PathBuf },

    #[error("{context}: {}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {artifact}")]
    Fetch {
        artifact: &'static str,
        #[source]
        source: Box<PackageError>,
    },

    /// Any step of an assembler after credential resolution. Carries a
    /// trace of the failing frame (captured when `RUST_BACKTRACE` is set).
    #[error("failed to build {target} package")]
    Assemble {
        target: &'static str,
        #[source]
        source: Box<PackageError>,
        trace: Arc<Backtrace>,
    },
}

impl PackageError {
    pub(crate) fn fetch(artifact: &'static str, source: PackageError) -> Self {
        PackageError::Fetch {
            artifact,
            source: Box::new(source),
        }
    }

    pub(crate) fn assemble(target: &'static str, source: PackageError) -> Self {
        PackageError::Assemble {
            target,
            source: Box::new(source),
            trace: Arc::new(Backtrace::capture()),
        }
    }

    pub(crate) fn io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        PackageError::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// The failing step, looking through the assembler wrapper
    pub fn cause(&self) -> &PackageError {
        match self {
            PackageError::Assemble { source, .. } => &**source,
            other => other,
        }
    }

    /// Name of the artifact whose fetch failed, if this is a fetch failure
    pub fn failed_artifact(&self) -> Option<&'static str> {
        match self.cause() {
            PackageError::Fetch { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// Stack trace recorded when an assembler step failed
    pub fn trace(&self) -> Option<&Backtrace> {
        match self {
            PackageError::Assemble { trace, .. } => Some(&**trace),
            _ => None,
        }
    }
}

pub type Result<T, E = PackageError> = std::result::Result<T, E>;
