//! Single-stream fallback transfer.
//!
//! Bytes go to `<name>.part` next to the destination and the file is renamed
//! into place only after the whole body was written. A failed transfer
//! leaves the partial file behind and reports it as the destination.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};
use url::Url;

use mlget_core::domain::STREAM_FAILURE_CODE;
use mlget_core::{
    TransferError, TransferPort, TransferRequest, TransferResult, TransferStrategyKind,
};

/// Read size for local sources and write buffer size.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// [`TransferPort`] that streams over HTTP(S) or copies a `file://` source.
#[derive(Clone, Default)]
pub struct StreamTransfer {
    client: reqwest::Client,
}

impl StreamTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, request: &TransferRequest, part: &Path) -> Result<u64> {
        let url = Url::parse(&request.url)
            .with_context(|| format!("'{}' is not a URL", request.url))?;
        match url.scheme() {
            "file" => copy_local(&url, part, request).await,
            "http" | "https" => self.copy_remote(url, part, request).await,
            other => bail!("Unsupported URL scheme '{other}'"),
        }
    }

    async fn copy_remote(&self, url: Url, part: &Path, request: &TransferRequest) -> Result<u64> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Server rejected {url}"))?;

        let total = response.content_length();
        let mut writer = create_part(part).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Error while reading response body")?;
            writer
                .write_all(&chunk)
                .await
                .context("Failed to write partial file")?;
            downloaded += chunk.len() as u64;
            report(request, downloaded, total);
        }

        writer.flush().await.context("Failed to flush partial file")?;
        Ok(downloaded)
    }
}

async fn copy_local(url: &Url, part: &Path, request: &TransferRequest) -> Result<u64> {
    let source = url
        .to_file_path()
        .map_err(|()| anyhow!("'{url}' does not name a local file"))?;
    let mut reader = File::open(&source)
        .await
        .with_context(|| format!("Failed to open {}", source.display()))?;
    let total = reader.metadata().await.ok().map(|m| m.len());

    let mut writer = create_part(part).await?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut copied = 0u64;
    loop {
        let n = reader
            .read(&mut buf)
            .await
            .with_context(|| format!("Failed to read {}", source.display()))?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .await
            .context("Failed to write partial file")?;
        copied += n as u64;
        report(request, copied, total);
    }

    writer.flush().await.context("Failed to flush partial file")?;
    Ok(copied)
}

async fn create_part(part: &Path) -> Result<BufWriter<File>> {
    let file = File::create(part)
        .await
        .with_context(|| format!("Failed to create {}", part.display()))?;
    Ok(BufWriter::with_capacity(CHUNK_SIZE, file))
}

fn report(request: &TransferRequest, downloaded: u64, total: Option<u64>) {
    if let Some(progress) = &request.progress {
        progress(downloaded, total);
    }
}

#[async_trait]
impl TransferPort for StreamTransfer {
    fn kind(&self) -> TransferStrategyKind {
        TransferStrategyKind::Streaming
    }

    async fn transfer(&self, request: TransferRequest) -> Result<TransferResult, TransferError> {
        fs::create_dir_all(&request.destination_dir)
            .await
            .map_err(|e| TransferError::Destination {
                path: request.destination_dir.display().to_string(),
                reason: e.to_string(),
            })?;

        let final_path = request.final_path();
        let part = request.part_path();
        info!(url = %request.url, out = %final_path.display(), "Starting streaming transfer");

        let outcome = match self.fetch(&request, &part).await {
            Ok(bytes) => fs::rename(&part, &final_path)
                .await
                .with_context(|| format!("Failed to move {} into place", part.display()))
                .map(|()| bytes),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(bytes) => {
                debug!(bytes, out = %final_path.display(), "Streaming transfer finished");
                Ok(TransferResult {
                    url: request.url,
                    destination: final_path,
                    status_code: 0,
                    stdout: String::new(),
                    stderr: String::new(),
                    resumable: false,
                    strategy: TransferStrategyKind::Streaming,
                })
            }
            Err(e) => {
                let resumable = part.exists();
                warn!(
                    url = %request.url,
                    error = %format!("{e:#}"),
                    resumable,
                    "Streaming transfer failed"
                );
                Ok(TransferResult {
                    url: request.url,
                    destination: part,
                    status_code: STREAM_FAILURE_CODE,
                    stdout: String::new(),
                    stderr: format!("{e:#}"),
                    resumable,
                    strategy: TransferStrategyKind::Streaming,
                })
            }
        }
    }
}
