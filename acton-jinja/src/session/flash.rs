//! Cookie-backed flash messages.
//!
//! Flash messages are one-time values carried from one request to the next
//! in a single cookie. They're commonly used for displaying success/error
//! messages after form submissions (post-redirect-get pattern).
//!
//! # Wire format
//!
//! Pairs are joined with NUL, key and value are joined with `#<separator>#`,
//! and the whole string is URL-escaped:
//!
//! ```text
//! url_escape("success#BEEGOFLASH#Saved\x00notice#BEEGOFLASH#Check your inbox")
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_jinja::prelude::*;
//!
//! // In form handler - add flash message
//! async fn create_user(State(app): State<App>, mut cookies: CookieJar) -> Result<impl IntoResponse> {
//!     // ... create user ...
//!     let flash = FlashData::new().with(FlashKind::Success, "User created!");
//!     write_flash(&mut cookies, &app.config.flash, &flash)?;
//!     Ok((cookies, Redirect::to("/users")))
//! }
//! ```

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use super::config::FlashConfig;
use crate::cookies::CookieJar;
use crate::error::{Error, Result};

/// Bytes left alone by query escaping: ASCII alphanumerics and `-_.~`.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Separator between encoded pairs.
const PAIR_SEPARATOR: char = '\x00';

/// Conventional flash keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    /// Success message (e.g., "Item saved successfully")
    Success,
    /// Informational message (e.g., "Your session will expire soon")
    Notice,
    /// Warning message (e.g., "This action cannot be undone")
    Warning,
    /// Error message (e.g., "Failed to save item")
    Error,
}

impl FlashKind {
    /// The key this kind is stored under.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// The kind stored under `key`, if it is a conventional one.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "success" => Some(Self::Success),
            "notice" => Some(Self::Notice),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns the CSS class name for this flash kind.
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Notice => "flash-info",
            Self::Warning => "flash-warning",
            Self::Error => "flash-error",
        }
    }
}

/// Decoded flash values, keyed by name.
///
/// Serializes as a plain map, so templates can write `{{ flash.success }}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlashData(BTreeMap<String, String>);

impl FlashData {
    /// Create empty flash data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set the message for a conventional kind.
    #[must_use]
    pub fn with(mut self, kind: FlashKind, message: impl Into<String>) -> Self {
        self.insert(kind.key(), message);
        self
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Look up the message for a conventional kind.
    #[must_use]
    pub fn message(&self, kind: FlashKind) -> Option<&str> {
        self.get(kind.key())
    }

    /// Check if there are any values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Borrow the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlashData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Read and consume the flash cookie.
///
/// A missing cookie yields empty data and leaves the response untouched.
/// Otherwise the value is decoded best-effort: malformed segments are
/// dropped, and the cookie is expired so the browser does not send it again.
pub fn read_flash(cookies: &mut CookieJar, config: &FlashConfig) -> FlashData {
    let Some(raw) = cookies.get(&config.cookie_name) else {
        return FlashData::new();
    };

    let data = decode_flash(raw, &config.marker());
    tracing::debug!(
        cookie = %config.cookie_name,
        entries = data.len(),
        "Consumed flash cookie"
    );

    cookies.expire(&config.cookie_name);
    data
}

/// Encode flash data and queue it as the flash cookie.
///
/// Empty data writes nothing. Entries that would not decode back to
/// themselves are rejected: empty keys, NUL bytes, and any `#<separator>#`
/// marker, including one formed across the key/value boundary.
pub fn write_flash(cookies: &mut CookieJar, config: &FlashConfig, data: &FlashData) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let marker = config.marker();
    let mut encoded = String::new();
    for (key, value) in data.iter() {
        if key.is_empty() {
            return Err(Error::BadRequest("flash key must not be empty".to_string()));
        }
        if key.contains(PAIR_SEPARATOR) || value.contains(PAIR_SEPARATOR) {
            return Err(Error::BadRequest(format!(
                "flash entry {key:?} cannot be encoded"
            )));
        }

        let pair = format!("{key}{marker}{value}");
        let parts: Vec<&str> = pair.split(marker.as_str()).collect();
        if parts != [key, value] {
            return Err(Error::BadRequest(format!(
                "flash entry {key:?} cannot be encoded"
            )));
        }

        if !encoded.is_empty() {
            encoded.push(PAIR_SEPARATOR);
        }
        encoded.push_str(&pair);
    }

    let value = utf8_percent_encode(&encoded, QUERY_ESCAPE).to_string();
    cookies.add(cookie::Cookie::build((config.cookie_name.clone(), value)).path("/"));
    Ok(())
}

/// Decode a raw cookie value into flash data.
fn decode_flash(raw: &str, marker: &str) -> FlashData {
    let unescaped = query_unescape(raw);

    let mut data = FlashData::new();
    for segment in unescaped.split(PAIR_SEPARATOR).filter(|s| !s.is_empty()) {
        let parts: Vec<&str> = segment.split(marker).collect();
        match parts.as_slice() {
            [key, value] => data.insert(*key, *value),
            _ => tracing::debug!(segment, "Dropping malformed flash segment"),
        }
    }
    data
}

/// Query unescape: `+` becomes a space and `%XX` is decoded.
///
/// Any `%` not followed by two hex digits makes the whole value decode to
/// the empty string. Invalid UTF-8 is replaced.
fn query_unescape(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let well_formed = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .all(|(i, _)| {
            bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        });
    if !well_formed {
        tracing::debug!("Discarding flash cookie with invalid escape");
        return String::new();
    }

    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

    fn jar_with(name: &str, value: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{name}={value}")).unwrap(),
        );
        CookieJar::from_headers(&headers)
    }

    fn config() -> FlashConfig {
        FlashConfig {
            cookie_name: "FLASH".to_string(),
            separator: "SEP".to_string(),
        }
    }

    #[test]
    fn test_decode_escaped_pairs() {
        let escaped = utf8_percent_encode("a#SEP#1\x00b#SEP#2", QUERY_ESCAPE).to_string();
        let mut jar = jar_with("FLASH", &escaped);

        let data = read_flash(&mut jar, &config());
        let expected: FlashData = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(data, expected);
    }

    #[test]
    fn test_missing_cookie_is_empty_and_silent() {
        let mut jar = jar_with("OTHER", "x");
        let data = read_flash(&mut jar, &config());
        assert!(data.is_empty());
        assert_eq!(jar.delta().count(), 0);
    }

    #[test]
    fn test_malformed_segments_dropped() {
        let raw = "justkey\x00a#SEP#b#SEP#c\x00ok#SEP#yes\x00\x00";
        let escaped = utf8_percent_encode(raw, QUERY_ESCAPE).to_string();
        let mut jar = jar_with("FLASH", &escaped);

        let data = read_flash(&mut jar, &config());
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("ok"), Some("yes"));
    }

    #[test]
    fn test_read_expires_cookie() {
        let escaped = utf8_percent_encode("a#SEP#1", QUERY_ESCAPE).to_string();
        let mut jar = jar_with("FLASH", &escaped);
        let _ = read_flash(&mut jar, &config());

        let cleared: Vec<_> = jar.delta().collect();
        assert_eq!(cleared.len(), 1);
        assert_eq!(cleared[0].name(), "FLASH");
        assert_eq!(cleared[0].value(), "");
        assert_eq!(cleared[0].path(), Some("/"));
        assert!(cleared[0].max_age().unwrap().is_negative());
    }

    #[test]
    fn test_query_unescape() {
        assert_eq!(query_unescape("hello+world%21"), "hello world!");
        assert_eq!(query_unescape("%C3%A9t%C3%A9"), "été");
        assert_eq!(query_unescape("100%"), "");
        assert_eq!(query_unescape("%zz"), "");
        assert_eq!(query_unescape("%4"), "");
        assert_eq!(query_unescape("%ff"), "\u{FFFD}");
    }

    #[test]
    fn test_bad_escape_discards_whole_cookie() {
        let mut jar = jar_with("FLASH", "msg%23SEP%2350%");
        let data = read_flash(&mut jar, &config());
        assert!(data.is_empty());

        let cleared: Vec<_> = jar.delta().collect();
        assert_eq!(cleared.len(), 1);
        assert_eq!(cleared[0].value(), "");
    }

    #[test]
    fn test_written_cookie_reads_back() {
        let data = FlashData::new()
            .with(FlashKind::Success, "Saved & done")
            .with(FlashKind::Notice, "a+b=c");

        let mut writer = CookieJar::new();
        write_flash(&mut writer, &config(), &data).unwrap();
        let value = writer.get("FLASH").unwrap().to_owned();
        assert!(!value.contains(' '));

        let mut reader = jar_with("FLASH", &value);
        assert_eq!(read_flash(&mut reader, &config()), data);
    }

    #[test]
    fn test_write_rejects_unencodable_entries() {
        let mut jar = CookieJar::new();
        let bad: FlashData = [("k", "x#SEP#y")].into_iter().collect();
        assert!(matches!(
            write_flash(&mut jar, &config(), &bad),
            Err(Error::BadRequest(_))
        ));

        let bad: FlashData = [("k\x00", "v")].into_iter().collect();
        assert!(write_flash(&mut jar, &config(), &bad).is_err());

        let bad: FlashData = [("", "v")].into_iter().collect();
        assert!(write_flash(&mut jar, &config(), &bad).is_err());
        assert_eq!(jar.delta().count(), 0);
    }

    #[test]
    fn test_write_rejects_marker_across_boundary() {
        let mut jar = CookieJar::new();
        for (key, value) in [("a#SEP", "v"), ("key#SEP", "SEP#v")] {
            let data: FlashData = [(key, value)].into_iter().collect();
            assert!(
                matches!(write_flash(&mut jar, &config(), &data), Err(Error::BadRequest(_))),
                "{key:?} / {value:?} should be rejected"
            );
        }
        assert_eq!(jar.delta().count(), 0);

        // partial markers that still split back to the same pair are fine
        let data: FlashData = [("a#", "SEP#v"), ("b#SE", "P#v"), ("c", "#SEPx")]
            .into_iter()
            .collect();
        write_flash(&mut jar, &config(), &data).unwrap();
        let value = jar.get("FLASH").unwrap().to_owned();
        assert_eq!(read_flash(&mut jar_with("FLASH", &value), &config()), data);
    }

    #[test]
    fn test_write_empty_is_noop() {
        let mut jar = CookieJar::new();
        write_flash(&mut jar, &config(), &FlashData::new()).unwrap();
        assert_eq!(jar.delta().count(), 0);
    }

    #[test]
    fn test_flash_kind_keys() {
        assert_eq!(FlashKind::Success.key(), "success");
        assert_eq!(FlashKind::Error.css_class(), "flash-error");
        assert_eq!(FlashKind::from_key("warning"), Some(FlashKind::Warning));
        assert_eq!(FlashKind::from_key("other"), None);
        let data = FlashData::new().with(FlashKind::Warning, "careful");
        assert_eq!(data.message(FlashKind::Warning), Some("careful"));
    }
}
