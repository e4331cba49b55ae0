//! Request-scoped cookie jar.
//!
//! Wraps [`cookie::CookieJar`]: cookies parsed from the request's `Cookie`
//! headers are the originals, anything added afterwards is the delta that
//! must be sent back as `Set-Cookie`.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    response::{IntoResponseParts, ResponseParts},
};
use cookie::{time::Duration, Cookie, Key};

/// Cookies of the current request plus pending response cookies.
///
/// Extract it in a handler, hand it to the renderer, and either return it
/// alongside your response or let [`Renderer::render`](crate::templates::Renderer::render)
/// attach the pending cookies for you.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    jar: cookie::CookieJar,
}

impl CookieJar {
    /// Create an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a jar from the `Cookie` headers of a request.
    ///
    /// Unparseable cookie pairs are skipped.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut jar = cookie::CookieJar::new();
        for value in headers.get_all(COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for cookie in Cookie::split_parse(value.to_owned()).flatten() {
                jar.add_original(cookie);
            }
        }
        Self { jar }
    }

    /// Raw value of a request or pending cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.jar.get(name).map(Cookie::value)
    }

    /// Value of a signed cookie, `None` if missing or the signature does not verify.
    #[must_use]
    pub fn get_signed(&self, key: &Key, name: &str) -> Option<String> {
        self.jar
            .signed(key)
            .get(name)
            .map(|cookie| cookie.value().to_owned())
    }

    /// Queue a cookie for the response.
    pub fn add(&mut self, cookie: impl Into<Cookie<'static>>) {
        self.jar.add(cookie);
    }

    /// Queue a signed cookie for the response.
    pub fn add_signed(&mut self, key: &Key, cookie: impl Into<Cookie<'static>>) {
        self.jar.signed_mut(key).add(cookie);
    }

    /// Tell the browser to drop a cookie: empty value, negative max-age, root path.
    pub fn expire(&mut self, name: &str) {
        self.jar.add(
            Cookie::build((name.to_owned(), ""))
                .path("/")
                .max_age(Duration::seconds(-1)),
        );
    }

    /// Cookies queued for the response.
    pub fn delta(&self) -> impl Iterator<Item = &Cookie<'static>> {
        self.jar.delta()
    }

    /// `Set-Cookie` header values for the pending cookies.
    pub fn set_cookie_values(&self) -> Vec<HeaderValue> {
        self.delta()
            .filter_map(|cookie| HeaderValue::from_str(&cookie.to_string()).ok())
            .collect()
    }

    /// Append the pending cookies to a header map.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for value in self.set_cookie_values() {
            headers.append(SET_COOKIE, value);
        }
    }
}

impl<S> FromRequestParts<S> for CookieJar
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

impl IntoResponseParts for CookieJar {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.apply(res.headers_mut());
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_parse_request_cookies() {
        let jar = CookieJar::from_headers(&headers("a=1; b=two"));
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("b"), Some("two"));
        assert_eq!(jar.get("c"), None);
        assert_eq!(jar.delta().count(), 0);
    }

    #[test]
    fn test_expire_writes_clearing_cookie() {
        let mut jar = CookieJar::from_headers(&headers("gone=bye"));
        jar.expire("gone");

        let cookie = jar.delta().next().unwrap();
        assert_eq!(cookie.name(), "gone");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.max_age().unwrap().is_negative());

        let values = jar.set_cookie_values();
        assert_eq!(values.len(), 1);
        assert!(values[0].to_str().unwrap().contains("Max-Age=-1"));
    }

    #[test]
    fn test_signed_round_trip() {
        let key = Key::derive_from(b"0123456789abcdef0123456789abcdef");
        let mut writer = CookieJar::new();
        writer.add_signed(&key, Cookie::new("token", "secret-value"));
        let signed = writer.get("token").unwrap().to_owned();
        assert_ne!(signed, "secret-value");

        let reader = CookieJar::from_headers(&headers(&format!("token={signed}")));
        assert_eq!(
            reader.get_signed(&key, "token").as_deref(),
            Some("secret-value")
        );

        let other = Key::derive_from(b"ffffffffffffffffffffffffffffffff");
        assert_eq!(reader.get_signed(&other, "token"), None);
    }

    #[test]
    fn test_unsigned_value_rejected() {
        let key = Key::derive_from(b"0123456789abcdef0123456789abcdef");
        let jar = CookieJar::from_headers(&headers("token=forged"));
        assert_eq!(jar.get_signed(&key, "token"), None);
    }
}
