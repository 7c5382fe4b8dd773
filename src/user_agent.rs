//! Shared User-Agent string for client HTTP traffic.
//!
//! Single source for project URL and UA format so upload, resolver, and
//! download traffic stay consistent and easy to update (good citizenship;
//! RFC 9308).

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/anonfile-rs/anonfile-client";

/// Default User-Agent for all client requests (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("anonfile-client/{version} (file-host-client; +{PROJECT_UA_URL})")
}
