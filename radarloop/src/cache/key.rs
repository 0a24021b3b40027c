//! Canonical cache keys for frame requests.
//!
//! Two requests that differ only in query parameter order, or in volatile
//! parameters such as cache-busting timestamps, map to the same key.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Default prefix marking volatile query parameters (e.g. `_ts`).
pub const DEFAULT_VOLATILE_PREFIX: &str = "_";

/// Characters escaped when re-encoding a parameter name or value.
///
/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A canonical request signature used as a frame store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Canonicalize a request URL.
    ///
    /// Query parameters whose name starts with `volatile_prefix` are dropped,
    /// the rest are sorted by name then value and re-encoded. Input that is
    /// not a parseable URL is kept verbatim.
    pub fn from_url(raw_url: &str, volatile_prefix: &str) -> Self {
        Self(canonicalize(raw_url, volatile_prefix))
    }

    /// Borrow the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a request URL into `{origin}{path}?{sorted-params}`.
pub fn canonicalize(raw_url: &str, volatile_prefix: &str) -> String {
    let Ok(url) = Url::parse(raw_url) else {
        return raw_url.to_string();
    };

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| volatile_prefix.is_empty() || !name.starts_with(volatile_prefix))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    params.sort();

    let query = params
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(name, COMPONENT),
                utf8_percent_encode(value, COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}{}?{}", url.origin().ascii_serialization(), url.path(), query)
}
