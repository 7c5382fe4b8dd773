//! Integration tests for the client's three operations.
//!
//! These tests verify the full resolve/download/upload flows against mock
//! HTTP servers.

use std::time::Duration;

use anonfile_client::{AnonFileClient, Error, UploadOutcome};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Landing page markup with the download anchor pointing at `href`.
fn landing_page(href: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>report.pdf - AnonFile</title></head>
  <body>
    <nav><a id="download-url-2" href="/premium">premium</a></nav>
    <main>
      <a class="btn" target="_blank" id="download-url" href="{href}">Download</a>
    </main>
  </body>
</html>"#
    )
}

/// Mounts a landing page at `/u1Abc2de/file` and a direct file endpoint at
/// `/cdn/file.bin`, returning the mock server.
async fn setup_file_host(content: &[u8]) -> MockServer {
    let server = MockServer::start().await;

    let direct_url = format!("{}/cdn/file.bin", server.uri());
    Mock::given(method("GET"))
        .and(path("/u1Abc2de/file"))
        .respond_with(ResponseTemplate::new(200).set_body_string(landing_page(&direct_url)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cdn/file.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_resolve_returns_exact_href() {
    let server = setup_file_host(b"irrelevant").await;
    let client = AnonFileClient::new();

    let page_url = format!("{}/u1Abc2de/file", server.uri());
    let direct = client
        .resolve_direct_download_link(&page_url)
        .await
        .expect("resolution should succeed");

    assert_eq!(direct, format!("{}/cdn/file.bin", server.uri()));
}

#[tokio::test]
async fn test_resolve_fails_when_anchor_is_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>This file was removed.</p></body></html>"),
        )
        .mount(&server)
        .await;

    let client = AnonFileClient::new();
    let error = client
        .resolve_direct_download_link(&format!("{}/gone", server.uri()))
        .await
        .expect_err("should fail without the anchor");

    assert!(matches!(error, Error::LinkNotFound { .. }), "got: {error}");
}

#[tokio::test]
async fn test_resolve_maps_error_status_to_network_kind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = AnonFileClient::new();
    let error = client
        .resolve_direct_download_link(&format!("{}/missing", server.uri()))
        .await
        .expect_err("404 should fail");

    assert!(matches!(error, Error::HttpStatus { status: 404, .. }), "got: {error}");
    assert!(error.is_network());
}

#[tokio::test]
async fn test_resolve_rejects_invalid_page_url() {
    let client = AnonFileClient::new();
    let error = client
        .resolve_direct_download_link("not a url")
        .await
        .expect_err("invalid URL should fail");

    assert!(matches!(error, Error::InvalidUrl { .. }), "got: {error}");
}

#[tokio::test]
async fn test_download_writes_exact_bytes() {
    let content: Vec<u8> = (0..=255u8).cycle().take(64 * 1024 + 17).collect();
    let server = setup_file_host(&content).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let destination = temp_dir.path().join("file.bin");

    let client = AnonFileClient::new();
    let page_url = format!("{}/u1Abc2de/file", server.uri());
    let bytes_written = client
        .download_file(&page_url, &destination)
        .await
        .expect("download should succeed");

    assert_eq!(bytes_written, content.len() as u64);
    let downloaded = std::fs::read(&destination).expect("should read file");
    assert_eq!(downloaded, content, "downloaded bytes must match fixture");
}

#[tokio::test]
async fn test_download_local_write_failure_is_filesystem_error() {
    let server = setup_file_host(b"payload").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let client = AnonFileClient::new();
    let page_url = format!("{}/u1Abc2de/file", server.uri());
    // The destination is an existing directory, so file creation fails.
    let error = client
        .download_file(&page_url, temp_dir.path())
        .await
        .expect_err("writing over a directory should fail");

    assert!(matches!(error, Error::Io { .. }), "got: {error}");
}

#[tokio::test]
async fn test_download_propagates_link_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let destination = temp_dir.path().join("file.bin");

    let client = AnonFileClient::new();
    let error = client
        .download_file(&format!("{}/gone", server.uri()), &destination)
        .await
        .expect_err("resolution failure should propagate");

    assert!(matches!(error, Error::LinkNotFound { .. }), "got: {error}");
    assert!(!destination.exists(), "no file may be created before transfer");
}

#[tokio::test]
async fn test_async_download_completes_and_joins() {
    let content = b"async transfer payload";
    let server = setup_file_host(content).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let destination = temp_dir.path().join("file.bin");

    let client = AnonFileClient::new();
    let page_url = format!("{}/u1Abc2de/file", server.uri());
    let handle = client
        .download_file_async(&page_url, &destination)
        .expect("spawn should succeed");

    assert_eq!(handle.destination(), destination.as_path());
    let bytes_written = handle.join().await.expect("transfer should succeed");
    assert_eq!(bytes_written, content.len() as u64);
    assert_eq!(std::fs::read(&destination).expect("read"), content);
}

#[tokio::test]
async fn test_cancelled_async_download_leaves_no_file() {
    let server = MockServer::start().await;
    let direct_url = format!("{}/cdn/slow.bin", server.uri());

    Mock::given(method("GET"))
        .and(path("/u1Abc2de/file"))
        .respond_with(ResponseTemplate::new(200).set_body_string(landing_page(&direct_url)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cdn/slow.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0u8; 1024 * 1024])
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let destination = temp_dir.path().join("slow.bin");

    let client = AnonFileClient::new();
    let page_url = format!("{}/u1Abc2de/file", server.uri());
    let handle = client
        .download_file_async(&page_url, &destination)
        .expect("spawn should succeed");

    handle.cancel();
    let error = handle.join().await.expect_err("cancelled transfer must fail");

    assert!(matches!(error, Error::Cancelled { .. }), "got: {error}");
    assert!(
        !destination.exists(),
        "cancellation must not leave a partial file at the destination"
    );
}

#[tokio::test]
async fn test_upload_success_parses_file_branch() {
    let server = MockServer::start().await;
    let body = r#"{"status":true,"data":{"file":{"url":{"full":"https://anonfile.com/u1Abc2de/fixture_bin","short":"https://anonfile.com/u1Abc2de"},"metadata":{"size":{"bytes":32}}}}}"#;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let fixture = temp_dir.path().join("fixture.bin");
    std::fs::write(&fixture, vec![7u8; 32]).expect("write fixture");

    let client = AnonFileClient::with_upload_endpoint(format!("{}/api/upload", server.uri()));
    let result = client.upload_file(&fixture).await.expect("upload should succeed");

    assert!(result.status());
    assert_eq!(result.raw, body);
    assert_eq!(
        result.outcome,
        UploadOutcome::Uploaded {
            full_url: "https://anonfile.com/u1Abc2de/fixture_bin".to_string(),
            short_url: "https://anonfile.com/u1Abc2de".to_string(),
            size_bytes: 32,
        }
    );
}

#[tokio::test]
async fn test_upload_rejection_parses_error_branch() {
    let server = MockServer::start().await;
    let body = r#"{"status":false,"data":{"error":{"message":"The file is too large","type":"ERROR_FILE_SIZE_EXCEEDED","code":31}}}"#;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let fixture = temp_dir.path().join("fixture.bin");
    std::fs::write(&fixture, b"data").expect("write fixture");

    let client = AnonFileClient::with_upload_endpoint(format!("{}/api/upload", server.uri()));
    let result = client.upload_file(&fixture).await.expect("rejections still parse");

    assert!(!result.status());
    assert_eq!(
        result.outcome,
        UploadOutcome::Rejected {
            message: "The file is too large".to_string(),
            kind: "ERROR_FILE_SIZE_EXCEEDED".to_string(),
            code: 31,
        }
    );
}

#[tokio::test]
async fn test_upload_malformed_body_is_schema_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>502 Bad Gateway</html>"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let fixture = temp_dir.path().join("fixture.bin");
    std::fs::write(&fixture, b"data").expect("write fixture");

    let client = AnonFileClient::with_upload_endpoint(format!("{}/api/upload", server.uri()));
    let error = client.upload_file(&fixture).await.expect_err("non-JSON must fail");

    assert!(matches!(error, Error::MalformedResponse { .. }), "got: {error}");
}

#[tokio::test]
async fn test_upload_missing_file_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = AnonFileClient::with_upload_endpoint(format!("{}/api/upload", server.uri()));
    let missing = std::path::Path::new("/definitely/not/here/fixture.bin");
    let error = client.upload_file(missing).await.expect_err("must fail");

    assert_eq!(
        error.to_string(),
        "invalid path detected at /definitely/not/here/fixture.bin"
    );
    assert!(matches!(error, Error::FileNotFound { .. }));

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "precondition failure must not hit the network");
}

#[tokio::test]
async fn test_upload_error_status_is_network_kind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let fixture = temp_dir.path().join("fixture.bin");
    std::fs::write(&fixture, b"data").expect("write fixture");

    let client = AnonFileClient::with_upload_endpoint(format!("{}/api/upload", server.uri()));
    let error = client.upload_file(&fixture).await.expect_err("503 must fail");

    assert!(matches!(error, Error::HttpStatus { status: 503, .. }), "got: {error}");
    assert!(error.is_network());
}

#[tokio::test]
async fn test_round_trip_reported_size_matches_fixture() {
    let fixture_content = vec![42u8; 1234];
    let server = MockServer::start().await;
    let body = format!(
        r#"{{"status":true,"data":{{"file":{{"url":{{"full":"https://anonfile.com/r0undTr1p/fixture_bin","short":"https://anonfile.com/r0undTr1p"}},"metadata":{{"size":{{"bytes":{}}}}}}}}}}}"#,
        fixture_content.len()
    );
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let fixture = temp_dir.path().join("fixture.bin");
    std::fs::write(&fixture, &fixture_content).expect("write fixture");

    let client = AnonFileClient::with_upload_endpoint(format!("{}/api/upload", server.uri()));
    let result = client.upload_file(&fixture).await.expect("upload should succeed");

    let UploadOutcome::Uploaded { size_bytes, .. } = result.outcome else {
        panic!("expected success outcome, got {:?}", result.outcome);
    };
    assert_eq!(size_bytes, fixture_content.len() as u64);
}
