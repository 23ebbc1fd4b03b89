//! Shared User-Agent string for gateway HTTP traffic.
//!
//! Single source for project URL and UA format so all requests from the tool
//! identify consistently and are easy to update (good citizenship; RFC 9308).

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/uplink-tools/uplink";

/// Default User-Agent for gateway requests (identifies the tool).
#[must_use]
pub(crate) fn default_gateway_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("uplink/{version} (content-publishing-tool; +{PROJECT_UA_URL})")
}
