//! # acton-jinja
//!
//! MiniJinja rendering for axum services, with request state forwarded into
//! every template.
//!
//! ## Features
//!
//! - **Cached templates**: templates under `templates/` are compiled once per process
//! - **Flash messages**: the flash cookie is decoded into `flash` and expired after one read
//! - **XSRF tokens**: the signed token cookie is exposed as `_xsrf` and `xsrf_field()`
//! - **URL building**: `url_for("route.name", "key", value)` from named routes
//! - **Dev mode**: `run_mode = "dev"` turns on template debugging and auto-reload
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_jinja::prelude::*;
//!
//! async fn index(
//!     State(renderer): State<Arc<Renderer>>,
//!     mut cookies: CookieJar,
//! ) -> Result<HtmlPage> {
//!     renderer.render(&mut cookies, "index.html", Some(Context::new().with("name", "World")))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let renderer = Arc::new(Renderer::builder(&config).route("index", "/").build()?);
//!     let app = Router::new().route("/", get(index)).with_state(renderer);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cookies;
pub mod error;
pub mod observability;
pub mod session;
pub mod templates;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::cookies::CookieJar;
    pub use crate::error::{Error, Result};
    pub use crate::observability::init_tracing;
    pub use crate::session::{read_flash, write_flash, FlashData, FlashKind, XsrfGuard};
    pub use crate::templates::{AssetFs, Context, HtmlPage, MemoryAssets, Renderer, RouteTable};

    pub use axum::{
        extract::State,
        response::{IntoResponse, Redirect},
        routing::{get, post},
        Router,
    };

    pub use std::sync::Arc;
}
