//! Cookie configuration types.

use serde::{Deserialize, Serialize};

/// Flash cookie configuration.
///
/// The defaults match the cookie written by Beego applications, so a
/// service can take over pages from one without losing pending messages.
///
/// # Example
///
/// ```toml
/// [flash]
/// cookie_name = "BEEGO_FLASH"
/// separator = "BEEGOFLASH"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashConfig {
    /// Flash cookie name.
    ///
    /// Default: `"BEEGO_FLASH"`
    #[serde(default = "default_flash_name")]
    pub cookie_name: String,

    /// Separator placed between `#` markers inside each key/value pair.
    ///
    /// Default: `"BEEGOFLASH"`
    #[serde(default = "default_flash_separator")]
    pub separator: String,
}

impl FlashConfig {
    /// The full marker between a key and its value: `#<separator>#`.
    #[must_use]
    pub fn marker(&self) -> String {
        format!("\x23{}\x23", self.separator)
    }
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_flash_name(),
            separator: default_flash_separator(),
        }
    }
}

/// Anti-forgery token configuration.
///
/// # Example
///
/// ```toml
/// [xsrf]
/// cookie_name = "_xsrf"
/// secret = "at-least-thirty-two-bytes-of-signing-secret"
/// expiry_secs = 3600
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XsrfConfig {
    /// Signed cookie holding the token.
    ///
    /// Default: `"_xsrf"`
    #[serde(default = "default_xsrf_name")]
    pub cookie_name: String,

    /// Secret the signing key is derived from (at least 32 bytes).
    ///
    /// Without a secret no token is read and `_xsrf` is never set.
    #[serde(default)]
    pub secret: Option<String>,

    /// Length of freshly issued tokens.
    ///
    /// Default: `32`
    #[serde(default = "default_token_length")]
    pub token_length: usize,

    /// Lifetime of the token cookie in seconds.
    ///
    /// Default: `3600`
    #[serde(default = "default_xsrf_expiry")]
    pub expiry_secs: i64,
}

impl Default for XsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_xsrf_name(),
            secret: None,
            token_length: default_token_length(),
            expiry_secs: default_xsrf_expiry(),
        }
    }
}

// Default value functions
fn default_flash_name() -> String {
    "BEEGO_FLASH".to_string()
}

fn default_flash_separator() -> String {
    "BEEGOFLASH".to_string()
}

fn default_xsrf_name() -> String {
    "_xsrf".to_string()
}

fn default_token_length() -> usize {
    32
}

fn default_xsrf_expiry() -> i64 {
    3600
}
