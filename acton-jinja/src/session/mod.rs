//! Cookie-borne request state forwarded into templates.
//!
//! - **Flash messages**: one-time key/value messages for post-redirect-get patterns
//! - **XSRF tokens**: signed-cookie anti-forgery tokens exposed to templates as `_xsrf`
//!
//! ```toml
//! # config.toml
//! [flash]
//! cookie_name = "BEEGO_FLASH"
//! separator = "BEEGOFLASH"
//!
//! [xsrf]
//! cookie_name = "_xsrf"
//! secret = "at-least-thirty-two-bytes-of-signing-secret"
//! ```

mod config;
mod flash;
mod xsrf;

pub use config::{FlashConfig, XsrfConfig};
pub use flash::{read_flash, write_flash, FlashData, FlashKind};
pub use xsrf::{read_xsrf_token, XsrfGuard, MIN_SECRET_LEN};
