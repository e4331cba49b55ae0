//! MiniJinja template rendering for axum handlers.
//!
//! Templates are looked up under `templates/` (relative to the configured
//! search path, or inside an asset filesystem), compiled once and cached by
//! the engine. Each render merges two request-derived values into the
//! caller's context:
//!
//! - `_xsrf`: the anti-forgery token from the signed XSRF cookie, if present
//! - `flash`: the decoded flash cookie, unless the caller already set `flash`
//!
//! # Quick Start
//!
//! ```html
//! <!-- templates/base.html -->
//! <!DOCTYPE html>
//! <html>
//!   <body>
//!     {% if flash.success %}<div class="flash-success">{{ flash.success }}</div>{% endif %}
//!     {% if flash.error %}<div class="flash-error">{{ flash.error }}</div>{% endif %}
//!     <form method="post" action="{{ url_for("user.update", "id", user.id) }}">
//!       {{ xsrf_field() }}
//!       {% block content %}{% endblock %}
//!     </form>
//!   </body>
//! </html>
//! ```
//!
//! ```rust,ignore
//! use acton_jinja::prelude::*;
//!
//! let renderer = Renderer::builder(&config)
//!     .route("user.update", "/users/{id}")
//!     .build()?;
//!
//! async fn edit(State(renderer): State<Arc<Renderer>>, mut cookies: CookieJar) -> Result<HtmlPage> {
//!     renderer.render(&mut cookies, "users/edit.html", Some(Context::new().with("user", user)))
//! }
//! ```

mod assets;
mod context;
mod helpers;
mod renderer;
mod response;

pub use assets::{AssetFs, MemoryAssets};
pub use context::{merge_context, Context, FLASH_KEY, XSRF_KEY};
pub use helpers::RouteTable;
pub use renderer::{Renderer, RendererBuilder};
pub use response::HtmlPage;

// Re-export the engine for custom filters and values
pub use minijinja;
