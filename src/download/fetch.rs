//! Media file fetching.
//!
//! Videos are resumable: the size already on disk is the only state, and
//! each attempt asks for the remaining bytes. Photos are small and always
//! fetched from scratch.

use std::fmt;
use std::path::Path;

use futures::StreamExt;
use indicatif::ProgressBar;
use reqwest::{Response, StatusCode};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::api::TumblrApi;
use crate::error::{Error, Result};
use crate::fs::MediumTarget;
use crate::media::MediumKind;
use crate::output::DownloadProgress;

/// Why a medium could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The server answered 403.
    AccessDenied,
    /// The size probe failed, so the medium was not attempted.
    ProbeFailed(String),
    /// Every attempt failed with a transient error.
    RetriesExhausted,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::AccessDenied => write!(f, "access denied"),
            FailureReason::ProbeFailed(e) => write!(f, "size probe failed: {}", e),
            FailureReason::RetriesExhausted => write!(f, "retries exhausted"),
        }
    }
}

/// Terminal state of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file was (fully) downloaded by this fetch.
    Completed,
    /// The file was already complete on disk.
    Skipped,
    /// Retries ran out; the partial file is kept for the next run.
    Incomplete,
    Failed(FailureReason),
}

/// Fetches media to disk with bounded retries.
#[derive(Debug, Clone)]
pub struct Fetcher {
    api: TumblrApi,
    retries: u32,
    progress: Option<DownloadProgress>,
}

impl Fetcher {
    pub fn new(api: TumblrApi, retries: u32, progress: Option<DownloadProgress>) -> Self {
        Self {
            api,
            retries,
            progress,
        }
    }

    /// Fetch a resolved medium to `dest` using the path for its kind.
    pub async fn fetch(&self, kind: MediumKind, target: &MediumTarget, dest: &Path) -> FetchOutcome {
        match kind {
            MediumKind::Photo => self.fetch_photo(&target.fetch_url, dest).await,
            MediumKind::Video => self.fetch_video(&target.fetch_url, dest).await,
        }
    }

    /// Download a video, resuming from whatever is already on disk.
    pub async fn fetch_video(&self, url: &str, dest: &Path) -> FetchOutcome {
        let total = match self.api.probe_total_size(url).await {
            Ok(total) => total,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                return FetchOutcome::Failed(FailureReason::ProbeFailed(e.to_string()));
            }
        };

        for attempt in 0..self.retries {
            let size = match prepare_partial(dest, total).await {
                Ok(size) => size,
                Err(e) => {
                    tracing::debug!("Cannot prepare {}: {}", dest.display(), e);
                    continue;
                }
            };

            if size == total {
                if attempt == 0 {
                    tracing::debug!("Already downloaded: {}", dest.display());
                    return FetchOutcome::Skipped;
                }
                return FetchOutcome::Completed;
            }

            tracing::debug!("Downloading {} from byte {} of {}", url, size, total);

            match self.download_range(url, dest, size, total).await {
                Ok(written) if written == total => {
                    tracing::info!("Downloaded: {}", dest.display());
                    return FetchOutcome::Completed;
                }
                Ok(written) => {
                    tracing::debug!("Short body for {}: {} of {} bytes", url, written, total);
                }
                Err(Error::AccessDenied(_)) => {
                    tracing::warn!("Access denied when retrieving {}", url);
                    return FetchOutcome::Failed(FailureReason::AccessDenied);
                }
                Err(e) => {
                    tracing::debug!("Attempt {} for {} failed: {}", attempt + 1, url, e);
                }
            }
        }

        match fs::metadata(dest).await {
            Ok(meta) if meta.len() == total => FetchOutcome::Completed,
            _ => {
                tracing::warn!(
                    "Giving up on {} after {} attempts, keeping partial file",
                    url,
                    self.retries
                );
                FetchOutcome::Incomplete
            }
        }
    }

    /// Download a photo unless it already exists. Partial files are removed on failure.
    pub async fn fetch_photo(&self, url: &str, dest: &Path) -> FetchOutcome {
        if dest.exists() {
            tracing::debug!("Skipping existing file: {}", dest.display());
            return FetchOutcome::Skipped;
        }

        tracing::debug!("Downloading {} from {}", dest.display(), url);

        for attempt in 1..=self.retries {
            match self.download_whole(url, dest).await {
                Ok(_) => {
                    tracing::info!("Downloaded: {}", dest.display());
                    return FetchOutcome::Completed;
                }
                Err(Error::AccessDenied(_)) => {
                    tracing::warn!("Access denied when retrieving {}", url);
                    remove_partial(dest).await;
                    return FetchOutcome::Failed(FailureReason::AccessDenied);
                }
                Err(e) => {
                    tracing::debug!("Attempt {} for {} failed: {}", attempt, url, e);
                }
            }
        }

        remove_partial(dest).await;
        tracing::warn!("Failed to retrieve photo from {}", url);
        FetchOutcome::Failed(FailureReason::RetriesExhausted)
    }

    /// Append bytes `offset..` to `dest`. Returns the file size afterwards.
    async fn download_range(&self, url: &str, dest: &Path, offset: u64, total: u64) -> Result<u64> {
        let response = self.api.get_range(url, offset).await?;

        let (mut file, start) = if offset > 0 && response.status() == StatusCode::OK {
            tracing::debug!("Range ignored by server for {}, rewriting", url);
            (File::create(dest).await?, 0)
        } else {
            let file = OpenOptions::new().append(true).create(true).open(dest).await?;
            (file, offset)
        };

        self.write_body(response, &mut file, start, Some(total), dest)
            .await
    }

    /// Write a whole body to a fresh `dest`.
    async fn download_whole(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self.api.get_medium(url).await?;
        let total = response.content_length();
        let mut file = File::create(dest).await?;

        self.write_body(response, &mut file, 0, total, dest).await
    }

    async fn write_body(
        &self,
        response: Response,
        file: &mut File,
        start: u64,
        total: Option<u64>,
        dest: &Path,
    ) -> Result<u64> {
        let label = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let bar = self
            .progress
            .as_ref()
            .and_then(|p| p.download_bar(total, start, &label));

        let result = stream_to_file(response, file, start, bar.as_ref()).await;

        if let Some(pb) = bar {
            pb.finish_and_clear();
        }

        result
    }
}

async fn stream_to_file(
    response: Response,
    file: &mut File,
    start: u64,
    bar: Option<&ProgressBar>,
) -> Result<u64> {
    let mut stream = response.bytes_stream();
    let mut written = start;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;

        if let Some(pb) = bar {
            pb.set_position(written);
        }
    }

    file.flush().await?;
    Ok(written)
}

/// Current size of a partial file, creating an empty one if needed.
///
/// A file larger than the remote medium cannot be a prefix of it and is reset.
async fn prepare_partial(dest: &Path, total: u64) -> Result<u64> {
    match fs::metadata(dest).await {
        Ok(meta) if meta.len() > total => {
            tracing::warn!(
                "{} is larger than the remote file ({} > {}), starting over",
                dest.display(),
                meta.len(),
                total
            );
            File::create(dest).await?;
            Ok(0)
        }
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            File::create(dest).await?;
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

async fn remove_partial(dest: &Path) {
    if let Err(e) = fs::remove_file(dest).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!("Cannot remove {}: {}", dest.display(), e);
        }
    }
}
