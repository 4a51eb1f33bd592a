//! Artifact download over HTTP

use std::future::Future;
use std::path::Path;

use futures::StreamExt;
use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tokio::io::AsyncWriteExt;

use crate::credentials::Credential;
use crate::error::BoxError;

/// Fetches a remote file into a local path, overwriting it
pub trait Downloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
        credential: &Credential,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Streams response bodies straight to disk.
///
/// No timeout is configured; a stalled transfer blocks until the
/// connection is dropped by the remote side or the process is killed.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("c8run-package/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Use a preconfigured client (proxy, TLS roots, timeouts)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Downloader for HttpDownloader {
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        credential: &Credential,
    ) -> Result<(), BoxError> {
        let mut request = self.client.get(url);
        if let Some(value) = credential.header_value() {
            let mut value = HeaderValue::from_str(&value)?;
            value.set_sensitive(true);
            request = request.header(AUTHORIZATION, value);
        }

        let response = request.send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(())
    }
}
