//! Anonfile Client Library
//!
//! Async client for anonfiles-style file-hosting services: upload a local
//! file via multipart POST, resolve the direct download link embedded in a
//! public landing page, and stream downloads to disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`client`] - Session lifecycle and the three public operations
//! - `resolver` - Landing-page HTML parsing and link extraction
//! - [`download`] - Streaming transfer, cancellable background downloads
//! - [`upload`] - Multipart upload and JSON response parsing
//! - [`error`] - Structured error types for every failure mode
//!
//! # Example
//!
//! ```no_run
//! use anonfile_client::AnonFileClient;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), anonfile_client::Error> {
//! let client = AnonFileClient::new();
//!
//! let result = client.upload_file(Path::new("./report.pdf")).await?;
//! if result.status() {
//!     println!("uploaded: {}", result.raw);
//! }
//!
//! client
//!     .download_file("https://anonfile.com/u1Abc2de/report_pdf", Path::new("./report.pdf"))
//!     .await?;
//!
//! client.close();
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod download;
pub mod error;
mod resolver;
pub mod upload;
mod user_agent;

pub use client::{AnonFileClient, DEFAULT_UPLOAD_ENDPOINT};
pub use download::DownloadHandle;
pub use error::Error;
pub use upload::{UploadOutcome, UploadResult};
