//! Archive codec primitives
//!
//! The building blocks the assemblers are composed of:
//!
//! - `download` - HTTP retrieval with an optional `Authorization` header
//! - `extract` - unpacking zip and tar.gz distributions
//! - `create` - writing the final zip or tar.gz bundle from a path list

mod create;
mod download;
mod extract;

pub use create::{create_tar_gz, create_zip};
pub use download::{Downloader, HttpDownloader};
pub use extract::{extract_tar_gz, extract_zip};
