//! Platform detection for distribution and package naming

use std::fmt;

use once_cell::sync::OnceCell;

use crate::error::{PackageError, Result};

/// Operating system label used in distribution URLs and package names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Windows,
    Linux,
    Darwin,
}

/// CPU architecture label used in distribution URLs and package names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: TargetOs,
    pub arch: Arch,
}

/// Global cache for platform detection (initialized once, used everywhere)
static PLATFORM_CACHE: OnceCell<Platform> = OnceCell::new();

impl Platform {
    pub const fn new(os: TargetOs, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the running platform (cached after first success)
    pub fn detect() -> Result<Self> {
        PLATFORM_CACHE
            .get_or_try_init(|| Self::from_parts(std::env::consts::OS, std::env::consts::ARCH))
            .copied()
    }

    /// Map Rust's `std::env::consts` identifiers to distribution labels.
    ///
    /// Unknown values fail here instead of producing a malformed URL later.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        let os = match os {
            "windows" => TargetOs::Windows,
            "linux" => TargetOs::Linux,
            "macos" => TargetOs::Darwin,
            other => return Err(PackageError::UnsupportedOs(other.to_string())),
        };
        let arch = match arch {
            "x86_64" => Arch::X86_64,
            "aarch64" => Arch::Aarch64,
            other => return Err(PackageError::UnsupportedArchitecture(other.to_string())),
        };
        Ok(Self { os, arch })
    }

    pub fn is_windows(&self) -> bool {
        self.os == TargetOs::Windows
    }

    /// Extension of both the downloaded distributions and the final package
    pub fn archive_extension(&self) -> &'static str {
        if self.is_windows() { "zip" } else { "tar.gz" }
    }
}

impl TargetOs {
    pub fn label(&self) -> &'static str {
        match self {
            TargetOs::Windows => "windows",
            TargetOs::Linux => "linux",
            TargetOs::Darwin => "darwin",
        }
    }
}

impl Arch {
    pub fn label(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.label(), self.arch.label())
    }
}
