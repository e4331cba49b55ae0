//! Anti-forgery (XSRF) token stored in a signed cookie.
//!
//! The token is read from a cookie signed with a key derived from the
//! configured secret. Tampered or unsigned cookies read as absent.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_jinja::session::XsrfGuard;
//!
//! let guard = XsrfGuard::from_config(&config.xsrf)?.expect("secret configured");
//! let token = guard.get_or_issue(&mut cookies);
//! ```

use cookie::{time::Duration, Cookie, Key};
use rand::Rng;

use super::config::XsrfConfig;
use crate::cookies::CookieJar;
use crate::error::{Error, Result};

/// Minimum secret length accepted for key derivation.
pub const MIN_SECRET_LEN: usize = 32;

/// Reads and issues anti-forgery tokens.
#[derive(Clone)]
pub struct XsrfGuard {
    cookie_name: String,
    key: Key,
    token_length: usize,
    expiry: Duration,
}

impl std::fmt::Debug for XsrfGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XsrfGuard")
            .field("cookie_name", &self.cookie_name)
            .field("token_length", &self.token_length)
            .finish_non_exhaustive()
    }
}

impl XsrfGuard {
    /// Build a guard from configuration.
    ///
    /// Returns `Ok(None)` when no secret is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is shorter than [`MIN_SECRET_LEN`] bytes.
    pub fn from_config(config: &XsrfConfig) -> Result<Option<Self>> {
        let Some(secret) = config.secret.as_deref() else {
            tracing::warn!("No xsrf secret configured, templates will not receive _xsrf");
            return Ok(None);
        };

        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::Internal(format!(
                "xsrf secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        Ok(Some(Self {
            cookie_name: config.cookie_name.clone(),
            key: Key::derive_from(secret.as_bytes()),
            token_length: config.token_length,
            expiry: Duration::seconds(config.expiry_secs),
        }))
    }

    /// Name of the token cookie.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// The verified token from the request, if any.
    #[must_use]
    pub fn token(&self, cookies: &CookieJar) -> Option<String> {
        cookies.get_signed(&self.key, &self.cookie_name)
    }

    /// Return the current token, issuing and queueing a fresh one when absent.
    pub fn get_or_issue(&self, cookies: &mut CookieJar) -> String {
        if let Some(token) = self.token(cookies) {
            return token;
        }

        let token = generate_token(self.token_length);
        cookies.add_signed(
            &self.key,
            Cookie::build((self.cookie_name.clone(), token.clone()))
                .path("/")
                .http_only(true)
                .max_age(self.expiry),
        );
        token
    }

    /// Check a submitted token against the cookie in constant time.
    #[must_use]
    pub fn verify(&self, cookies: &CookieJar, submitted: &str) -> bool {
        self.token(cookies)
            .is_some_and(|token| constant_time_compare(&token, submitted))
    }
}

/// Read the anti-forgery token, if a guard is configured and the cookie verifies.
#[must_use]
pub fn read_xsrf_token(cookies: &CookieJar, guard: Option<&XsrfGuard>) -> Option<String> {
    guard.and_then(|guard| guard.token(cookies))
}

/// Generate a random alphanumeric token.
fn generate_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
