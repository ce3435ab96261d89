//! User-Agent string for font file requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/font-cache";

/// Default User-Agent for font downloads.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("font-cache/{version} (+{PROJECT_UA_URL})")
}
