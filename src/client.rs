//! Client session: transport ownership, lifecycle, and the three public
//! operations (resolve, download, upload).
//!
//! One [`AnonFileClient`] owns one HTTP transport (connection pool) for
//! its whole lifetime. Operations are independent request/response
//! cycles; nothing discovered during one call is cached for the next.
//! Callers running overlapping operations should serialize them through
//! one session or create an independent session per operation.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::download::{self, DownloadHandle};
use crate::error::Error;
use crate::resolver;
use crate::upload::{self, UploadResult};
use crate::user_agent;

/// Default connect timeout for all requests.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default read timeout; generous because download bodies can be large.
/// A hung remote surfaces as [`Error::Timeout`], never an indefinite stall.
const READ_TIMEOUT_SECS: u64 = 300;

/// Fixed upload endpoint of the file-hosting service.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://anonfile.com/api/upload";

/// Client session for an anonfiles-style file host.
///
/// Holds the HTTP transport for its lifetime and exposes three
/// operations: landing-page link resolution, file download (blocking and
/// non-blocking), and multipart file upload.
///
/// # Lifecycle
///
/// The transport is acquired at construction and released with
/// [`close`](Self::close); every operation after `close` fails with
/// [`Error::ClosedSession`] without touching the network.
///
/// # Example
///
/// ```no_run
/// use anonfile_client::AnonFileClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), anonfile_client::Error> {
/// let client = AnonFileClient::new();
/// let result = client.upload_file(Path::new("./report.pdf")).await?;
/// println!("uploaded: {}", result.status());
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AnonFileClient {
    client: Client,
    upload_endpoint: String,
    closed: AtomicBool,
}

impl Default for AnonFileClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnonFileClient {
    /// Creates a client against the default upload endpoint.
    ///
    /// Default configuration: 10 second connect timeout, 5 minute read
    /// timeout, gzip decompression enabled.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_upload_endpoint(DEFAULT_UPLOAD_ENDPOINT)
    }

    /// Creates a client with a custom upload endpoint (for tests).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn with_upload_endpoint(endpoint: impl Into<String>) -> Self {
        Self::with_endpoint_and_timeouts(endpoint, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with a custom endpoint and explicit timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_endpoint_and_timeouts(
        endpoint: impl Into<String>,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            upload_endpoint: endpoint.into(),
            closed: AtomicBool::new(false),
        }
    }

    /// Fetches a public landing page and extracts the direct download URL.
    ///
    /// The returned URL is time-limited/token-bearing and serves the raw
    /// file bytes; it is handed back directly and never stored on the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClosedSession`] after [`close`](Self::close),
    /// [`Error::InvalidUrl`] for an unparseable page URL,
    /// [`Error::Network`] / [`Error::Timeout`] / [`Error::HttpStatus`] on
    /// transport failure, and [`Error::LinkNotFound`] when the page has
    /// no `download-url` anchor.
    #[instrument(skip(self), fields(url = %page_url))]
    pub async fn resolve_direct_download_link(&self, page_url: &str) -> Result<String, Error> {
        self.ensure_open()?;
        resolver::resolve_direct_download_link(&self.client, page_url).await
    }

    /// Downloads the file behind a landing page to `destination`, blocking
    /// until the transfer completes.
    ///
    /// Link resolution fully completes before the byte transfer begins.
    /// Returns the number of bytes written. On any failure the partial
    /// destination file is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors from
    /// [`resolve_direct_download_link`](Self::resolve_direct_download_link),
    /// plus [`Error::Io`] on local write failure and transport errors on
    /// the byte transfer itself.
    #[instrument(skip(self), fields(url = %page_url, dest = %destination.display()))]
    pub async fn download_file(&self, page_url: &str, destination: &Path) -> Result<u64, Error> {
        self.ensure_open()?;
        let direct_url = resolver::resolve_direct_download_link(&self.client, page_url).await?;
        download::fetch_to_path(&self.client, &direct_url, destination, None).await
    }

    /// Starts a non-blocking download and returns a cancellable handle.
    ///
    /// The resolve-then-transfer flow of
    /// [`download_file`](Self::download_file) runs on a background task;
    /// this call returns as soon as the task is spawned. Cancelling the
    /// handle removes the partial file, so the destination never holds an
    /// incomplete file that looks finished.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClosedSession`] after [`close`](Self::close).
    /// Transfer errors surface from [`DownloadHandle::join`].
    #[instrument(skip(self), fields(url = %page_url, dest = %destination.display()))]
    pub fn download_file_async(
        &self,
        page_url: &str,
        destination: &Path,
    ) -> Result<DownloadHandle, Error> {
        self.ensure_open()?;

        let client = self.client.clone();
        let page_url = page_url.to_string();
        let destination = destination.to_path_buf();
        let cancel = Arc::new(AtomicBool::new(false));

        let task_cancel = Arc::clone(&cancel);
        let task_destination = destination.clone();
        let task = tokio::spawn(async move {
            let direct_url = resolver::resolve_direct_download_link(&client, &page_url).await?;
            download::fetch_to_path(&client, &direct_url, &task_destination, Some(&*task_cancel))
                .await
        });

        debug!("spawned background download task");
        Ok(DownloadHandle::new(task, cancel, destination))
    }

    /// Uploads a local file and parses the service's JSON reply.
    ///
    /// The local precondition is checked first: a missing or non-regular
    /// file fails with [`Error::FileNotFound`] before any network call.
    /// No retries are performed; retry policy belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClosedSession`] after [`close`](Self::close),
    /// [`Error::FileNotFound`] on the precondition, transport errors on
    /// the POST, and [`Error::MalformedResponse`] when the reply is not
    /// JSON or the active status branch is incomplete.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadResult, Error> {
        self.ensure_open()?;
        upload::upload_file(&self.client, &self.upload_endpoint, path).await
    }

    /// Releases the session.
    ///
    /// Idempotent; every operation after the first `close` fails with
    /// [`Error::ClosedSession`]. Background downloads already in flight
    /// run to completion on their own transport handle.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::ClosedSession);
        }
        Ok(())
    }
}
