//! Streaming download of resolved direct links to local files.
//!
//! Bodies are streamed chunk-by-chunk through a buffered writer so large
//! files never sit fully in memory. On any failure or cancellation the
//! partial destination file is removed before the error is surfaced, so a
//! caller never mistakes an incomplete file for a finished transfer.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::Error;

/// Handle to an in-flight non-blocking download.
///
/// Returned by [`AnonFileClient::download_file_async`]. The caller can
/// [`cancel`](Self::cancel) the transfer or [`join`](Self::join) it to
/// observe completion or failure.
///
/// [`AnonFileClient::download_file_async`]: crate::AnonFileClient::download_file_async
#[derive(Debug)]
pub struct DownloadHandle {
    task: JoinHandle<Result<u64, Error>>,
    cancel: Arc<AtomicBool>,
    destination: PathBuf,
}

impl DownloadHandle {
    pub(crate) fn new(
        task: JoinHandle<Result<u64, Error>>,
        cancel: Arc<AtomicBool>,
        destination: PathBuf,
    ) -> Self {
        Self {
            task,
            cancel,
            destination,
        }
    }

    /// Requests cancellation of the transfer.
    ///
    /// The transfer loop observes the request between chunks, removes the
    /// partial file, and resolves the task to [`Error::Cancelled`]. A
    /// transfer that already ran to completion is unaffected.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Returns the destination path this download writes to.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Returns true once the background task has finished (success,
    /// failure, or cancellation).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the download to finish, returning the bytes written.
    ///
    /// # Errors
    ///
    /// Returns the transfer's error, or [`Error::Cancelled`] when the
    /// download was cancelled before completion.
    ///
    /// # Panics
    ///
    /// Propagates a panic from the background task, which indicates a bug
    /// in this crate rather than a recoverable condition.
    pub async fn join(self) -> Result<u64, Error> {
        match self.task.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_cancelled() => Err(Error::cancelled(self.destination)),
            Err(join_error) => std::panic::resume_unwind(join_error.into_panic()),
        }
    }
}

/// Streams the body at `url` into `destination`, creating or overwriting it.
///
/// `cancel` is polled between chunks; when it flips, the partial file is
/// removed and [`Error::Cancelled`] is returned. Returns bytes written.
pub(crate) async fn fetch_to_path(
    client: &Client,
    url: &str,
    destination: &Path,
    cancel: Option<&AtomicBool>,
) -> Result<u64, Error> {
    let is_cancelled = || cancel.is_some_and(|flag| flag.load(Ordering::SeqCst));

    if is_cancelled() {
        return Err(Error::cancelled(destination));
    }

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::transport(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::http_status(url, status.as_u16()));
    }

    let file = File::create(destination)
        .await
        .map_err(|e| Error::io(destination, e))?;

    match stream_to_file(file, response, url, destination, &is_cancelled).await {
        Ok(bytes_written) => {
            info!(path = %destination.display(), bytes = bytes_written, "download complete");
            Ok(bytes_written)
        }
        Err(error) => {
            debug!(path = %destination.display(), "removing partial file after failed transfer");
            let _ = tokio::fs::remove_file(destination).await;
            Err(error)
        }
    }
}

/// Streams the response body to the open file, returning bytes written.
///
/// Extracted so the caller owns partial-file cleanup on any error path.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    destination: &Path,
    is_cancelled: &impl Fn() -> bool,
) -> Result<u64, Error> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        if is_cancelled() {
            return Err(Error::cancelled(destination));
        }

        let chunk = chunk_result.map_err(|e| Error::transport(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| Error::io(destination, e))?;
        bytes_written += chunk.len() as u64;
    }

    // A cancel that raced the final chunk still counts: the contract is
    // that after cancel() the destination never holds an unmarked file.
    if is_cancelled() {
        return Err(Error::cancelled(destination));
    }

    writer
        .flush()
        .await
        .map_err(|e| Error::io(destination, e))?;

    Ok(bytes_written)
}
