//! Direct-download link resolution from vendor landing pages.
//!
//! The file host serves a public landing page whose markup carries the
//! real, token-bearing download URL in an anchor identified by
//! `id="download-url"`. The page is parsed into a document tree and the
//! anchor is located by element id; attribute ordering and whitespace in
//! the vendor markup therefore never affect extraction.

use std::sync::LazyLock;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Matches the single anchor carrying the direct download link.
///
/// An id selector matches the exact id only, so decoy ids like
/// `download-url-2` on error pages never match.
#[allow(clippy::expect_used)]
static DOWNLOAD_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a#download-url").expect("static selector is well-formed"));

/// Fetches the landing page and extracts the direct download URL.
///
/// Resolution fully completes before any byte transfer begins; the
/// returned URL is handed straight to the caller and never cached.
///
/// # Errors
///
/// - [`Error::InvalidUrl`] when `page_url` does not parse as a URL
/// - [`Error::Network`] / [`Error::Timeout`] on transport failure
/// - [`Error::HttpStatus`] on a non-2xx response
/// - [`Error::LinkNotFound`] when the page has no `download-url` anchor
pub(crate) async fn resolve_direct_download_link(
    client: &Client,
    page_url: &str,
) -> Result<String, Error> {
    Url::parse(page_url).map_err(|_| Error::invalid_url(page_url))?;

    let response = client
        .get(page_url)
        .send()
        .await
        .map_err(|e| Error::transport(page_url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::http_status(page_url, status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::transport(page_url, e))?;

    let link = extract_download_href(&body).ok_or_else(|| Error::link_not_found(page_url))?;
    debug!(page = %page_url, direct = %link, "resolved direct download link");
    Ok(link)
}

/// Extracts the `href` of the `download-url` anchor from raw HTML.
///
/// Pure markup query with no script execution; returns `None` when the
/// anchor or its `href` attribute is absent.
pub(crate) fn extract_download_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&DOWNLOAD_ANCHOR)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}
