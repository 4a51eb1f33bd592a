//! Camunda 8 Run release bundler
//!
//! Fetches the Elasticsearch and Camunda distributions plus the connector
//! runtime jar into a working tree and archives a fixed set of files into a
//! single platform-specific package (zip on Windows, tar.gz elsewhere).

pub mod archive;
pub mod clean;
pub mod config;
pub mod credentials;
pub mod error;
pub mod package;

pub use config::PackagerConfig;
pub use credentials::{Credential, CredentialSource};
pub use error::PackageError;
pub use package::{
    PackageRequest, Platform, ReleaseVersions, package, package_unix, package_windows,
};
