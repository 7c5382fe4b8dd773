//! Multipart file upload and response parsing.
//!
//! The upload endpoint answers with a JSON envelope whose `status` flag
//! selects one of two payload branches: file URLs plus metadata on
//! success, or a structured error on rejection. Parsing is strict about
//! the active branch; a missing required field is a malformed response,
//! never a silently defaulted value.

use std::path::Path;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::Error;

/// Parsed outcome of an upload call.
///
/// Keeps the raw response body alongside the structured outcome so
/// callers can log or re-inspect exactly what the service said.
#[derive(Debug, Clone)]
pub struct UploadResult {
    /// The unmodified response body text.
    pub raw: String,
    /// The decoded success or rejection payload.
    pub outcome: UploadOutcome,
}

/// One of the two mutually exclusive payload shapes of an upload reply.
///
/// The enum itself enforces that exactly one branch is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The service accepted the file.
    Uploaded {
        /// Full landing-page URL for the uploaded file.
        full_url: String,
        /// Shortened landing-page URL.
        short_url: String,
        /// Size in bytes as reported by the service.
        ///
        /// Wide unsigned type so a vendor-reported size never truncates
        /// at a 32-bit boundary.
        size_bytes: u64,
    },
    /// The service rejected the upload.
    Rejected {
        /// Human-readable error message.
        message: String,
        /// Error type/category reported by the service.
        kind: String,
        /// Numeric error code reported by the service.
        code: u32,
    },
}

impl UploadResult {
    /// Mirrors the `status` flag of the underlying JSON response.
    #[must_use]
    pub fn status(&self) -> bool {
        matches!(self.outcome, UploadOutcome::Uploaded { .. })
    }
}

/// Wire shape of the upload response envelope.
///
/// Both branches are optional at the `data` level; `parse_upload_response`
/// enforces that the branch selected by `status` is actually present.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: bool,
    data: Option<ApiData>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    error: Option<ApiError>,
    file: Option<ApiFile>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type")]
    kind: String,
    code: u32,
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    url: ApiFileUrl,
    metadata: ApiFileMetadata,
}

#[derive(Debug, Deserialize)]
struct ApiFileUrl {
    full: String,
    short: String,
}

#[derive(Debug, Deserialize)]
struct ApiFileMetadata {
    size: ApiFileSize,
}

#[derive(Debug, Deserialize)]
struct ApiFileSize {
    bytes: u64,
}

/// Uploads the file at `path` to `endpoint` and parses the JSON reply.
///
/// The local precondition is checked before any network call: `path` must
/// name an existing regular file.
///
/// # Errors
///
/// - [`Error::FileNotFound`] when `path` is not an existing regular file
/// - [`Error::Io`] when the file cannot be read
/// - [`Error::Network`] / [`Error::Timeout`] on transport failure
/// - [`Error::HttpStatus`] on a non-2xx response
/// - [`Error::MalformedResponse`] on JSON parse failure or schema mismatch
#[instrument(skip(client), fields(path = %path.display()))]
pub(crate) async fn upload_file(
    client: &Client,
    endpoint: &str,
    path: &Path,
) -> Result<UploadResult, Error> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|_| Error::file_not_found(path))?;
    if !metadata.is_file() {
        return Err(Error::file_not_found(path));
    }

    let file_name = path
        .file_name()
        .map_or_else(|| "file".to_string(), |name| name.to_string_lossy().into_owned());

    let bytes = tokio::fs::read(path).await.map_err(|e| Error::io(path, e))?;
    debug!(bytes = bytes.len(), "read upload payload");

    let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

    let response = client
        .post(endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(|e| Error::transport(endpoint, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::http_status(endpoint, status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::transport(endpoint, e))?;

    parse_upload_response(body)
}

/// Decodes an upload response body into an [`UploadResult`].
///
/// The branch selected by the `status` flag must be fully populated;
/// anything else is a schema mismatch.
pub(crate) fn parse_upload_response(raw: String) -> Result<UploadResult, Error> {
    let envelope: ApiResponse = serde_json::from_str(&raw)
        .map_err(|e| Error::malformed_response(format!("{e} in body: {raw}")))?;

    let data = envelope.data;
    let outcome = if envelope.status {
        let file = data
            .and_then(|d| d.file)
            .ok_or_else(|| Error::malformed_response("status is true but `data.file` is missing"))?;
        UploadOutcome::Uploaded {
            full_url: file.url.full,
            short_url: file.url.short,
            size_bytes: file.metadata.size.bytes,
        }
    } else {
        let error = data
            .and_then(|d| d.error)
            .ok_or_else(|| Error::malformed_response("status is false but `data.error` is missing"))?;
        UploadOutcome::Rejected {
            message: error.message,
            kind: error.kind,
            code: error.code,
        }
    };

    Ok(UploadResult { raw, outcome })
}
