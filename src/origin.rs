//! Base-address validation and trusted-origin derivation.
//!
//! The embedded application may only ever be loaded from, sent to, or
//! heard from a single origin. That origin is derived here from the
//! configured base address, which must be an `https` address on an
//! allow-listed assistant host with nothing but an origin in it.
//!
//! # Example
//!
//! ```
//! use corti_embedded::origin::{TrustedOrigin, is_genuine_load};
//!
//! let origin = TrustedOrigin::validate("https://assistant.eu.corti.app/").unwrap();
//! assert_eq!(origin.as_str(), "https://assistant.eu.corti.app");
//! assert_eq!(origin.embed_address(), "https://assistant.eu.corti.app/embedded");
//! assert!(!is_genuine_load("about:blank", &origin));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Path appended to the trusted origin to form the frame's load target.
pub const EMBED_PATH: &str = "/embedded";

/// Allow-listed assistant hosts: `assistant.<region>.corti.app`.
static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^assistant\.[a-z0-9-]+\.corti\.app$")
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("host pattern must compile: {e}"))
});

// ============================================================================
// TrustedOrigin
// ============================================================================

/// A validated `scheme://host[:port]` the bridge will talk to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrustedOrigin(String);

impl TrustedOrigin {
    /// Validates a raw base address and derives its origin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address is not parseable,
    /// is not `https`, names a host outside the allow-list, or carries a
    /// path, query, fragment or credentials.
    pub fn validate(raw: &str) -> Result<Self> {
        let parsed =
            Url::parse(raw).map_err(|_| Error::invalid_address("not a parseable URL"))?;

        if parsed.scheme() != "https" {
            return Err(Error::invalid_address("must use https"));
        }

        let host = host_with_port(&parsed).to_ascii_lowercase();
        if !HOST_PATTERN.is_match(&host) {
            return Err(Error::invalid_address(
                "host must match assistant.xxx.corti.app",
            ));
        }

        let path = parsed.path();
        if !path.is_empty() && path != "/" {
            return Err(Error::invalid_address("must not include a path"));
        }

        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(Error::invalid_address(
                "must not include a query or fragment",
            ));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(Error::invalid_address("must not include credentials"));
        }

        let origin = parsed.origin().ascii_serialization();
        Ok(Self(origin.trim_end_matches('/').to_string()))
    }

    /// Returns the origin string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the address the frame should load.
    #[inline]
    #[must_use]
    pub fn embed_address(&self) -> String {
        build_embed_address(self)
    }
}

impl fmt::Display for TrustedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrustedOrigin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Free Functions
// ============================================================================

/// Builds the frame load target for a trusted origin.
#[inline]
#[must_use]
pub fn build_embed_address(origin: &TrustedOrigin) -> String {
    format!("{}{}", origin.as_str(), EMBED_PATH)
}

/// Reports whether an observed frame `src` is the real embedded page.
///
/// Blank and other non-web sources are transitional states, not loads.
/// Query and fragment are ignored; a trailing slash on the path is allowed.
#[must_use]
pub fn is_genuine_load(observed_src: &str, trusted: &TrustedOrigin) -> bool {
    if observed_src.is_empty() || observed_src.starts_with("about:") {
        return false;
    }

    let Ok(src) = Url::parse(observed_src) else {
        return false;
    };

    if !matches!(src.scheme(), "http" | "https") {
        return false;
    }

    if src.origin().ascii_serialization() != trusted.as_str() {
        return false;
    }

    src.path().trim_end_matches('/') == EMBED_PATH
}

/// Resolves the origin a frame `src` currently points at.
///
/// Returns `None` for empty, unparseable or opaque (e.g. `about:blank`)
/// sources.
#[must_use]
pub fn resolve_origin(src: &str) -> Option<String> {
    if src.is_empty() {
        return None;
    }
    let origin = Url::parse(src).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

fn host_with_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn eu() -> TrustedOrigin {
        TrustedOrigin::validate("https://assistant.eu.corti.app").unwrap()
    }

    #[test]
    fn test_validate_strips_trailing_slash() {
        let origin = TrustedOrigin::validate("https://assistant.eu.corti.app/").unwrap();
        assert_eq!(origin.as_str(), "https://assistant.eu.corti.app");
    }

    #[test]
    fn test_validate_lowercases_host() {
        let origin = TrustedOrigin::validate("https://Assistant.US.Corti.App").unwrap();
        assert_eq!(origin.as_str(), "https://assistant.us.corti.app");
    }

    #[test]
    fn test_validate_rejects_unparseable() {
        let err = TrustedOrigin::validate("not a url").unwrap_err();
        assert!(err.to_string().contains("parseable"));
    }

    #[test]
    fn test_validate_rejects_http() {
        let err = TrustedOrigin::validate("http://assistant.eu.corti.app").unwrap_err();
        assert!(err.to_string().contains("https"));
    }

    #[test]
    fn test_validate_rejects_foreign_host() {
        for raw in [
            "https://evil.example",
            "https://assistant.corti.app",
            "https://assistant.eu.corti.app.evil.example",
            "https://x.assistant.eu.corti.app",
            "https://assistant.eu.corti.app:8443",
        ] {
            let err = TrustedOrigin::validate(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidAddress { .. }), "{raw}");
        }
    }

    #[test]
    fn test_validate_rejects_path() {
        let err = TrustedOrigin::validate("https://assistant.eu.corti.app/embedded").unwrap_err();
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn test_validate_rejects_query_and_fragment() {
        assert!(TrustedOrigin::validate("https://assistant.eu.corti.app/?a=1").is_err());
        assert!(TrustedOrigin::validate("https://assistant.eu.corti.app/#top").is_err());
    }

    #[test]
    fn test_validate_rejects_credentials() {
        let err =
            TrustedOrigin::validate("https://user:pw@assistant.eu.corti.app").unwrap_err();
        assert!(err.to_string().contains("credentials"));
    }

    #[test]
    fn test_embed_address() {
        assert_eq!(eu().embed_address(), "https://assistant.eu.corti.app/embedded");
    }

    #[test]
    fn test_blank_is_not_genuine() {
        assert!(!is_genuine_load("about:blank", &eu()));
        assert!(!is_genuine_load("", &eu()));
        assert!(!is_genuine_load("data:text/html,hi", &eu()));
    }

    #[test]
    fn test_embedded_with_query_is_genuine() {
        let origin = eu();
        let src = format!("{}/embedded/?x=1", origin);
        assert!(is_genuine_load(&src, &origin));
        assert!(is_genuine_load(&format!("{origin}/embedded#frag"), &origin));
    }

    #[test]
    fn test_other_origin_is_not_genuine() {
        let origin = eu();
        let other = TrustedOrigin::validate("https://assistant.us.corti.app").unwrap();
        assert!(!is_genuine_load(&format!("{origin}/embedded"), &other));
    }

    #[test]
    fn test_other_path_is_not_genuine() {
        let origin = eu();
        assert!(!is_genuine_load(&format!("{origin}/"), &origin));
        assert!(!is_genuine_load(&format!("{origin}/embedded/x"), &origin));
    }

    #[test]
    fn test_resolve_origin() {
        assert_eq!(
            resolve_origin("https://assistant.eu.corti.app/embedded?x=1").as_deref(),
            Some("https://assistant.eu.corti.app")
        );
        assert_eq!(resolve_origin("about:blank"), None);
        assert_eq!(resolve_origin(""), None);
        assert_eq!(resolve_origin("/embedded"), None);
    }

    proptest! {
        #[test]
        fn prop_allow_listed_hosts_validate(
            region in "[a-z0-9]{1,6}(-[a-z0-9]{1,6})?",
            slash in proptest::bool::ANY,
        ) {
            let raw = format!(
                "https://assistant.{region}.corti.app{}",
                if slash { "/" } else { "" }
            );
            let origin = TrustedOrigin::validate(&raw).unwrap();
            let expected = format!("https://assistant.{region}.corti.app");
            prop_assert_eq!(origin.as_str(), expected.as_str());
            prop_assert!(!origin.as_str().ends_with('/'));
        }

        #[test]
        fn prop_paths_are_rejected(
            region in "[a-z0-9]{1,8}",
            segment in "[a-z]{1,8}",
        ) {
            let raw = format!("https://assistant.{region}.corti.app/{segment}");
            let rejected = matches!(
                TrustedOrigin::validate(&raw),
                Err(Error::InvalidAddress { .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn prop_foreign_hosts_are_rejected(host in "[a-z]{1,10}\\.(com|org|net)") {
            let raw = format!("https://{host}");
            prop_assert!(TrustedOrigin::validate(&raw).is_err());
        }
    }
}
