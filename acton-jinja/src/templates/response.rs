//! HTML response produced by a render.

use axum::{
    http::{header::SET_COOKIE, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::cookies::CookieJar;

/// A rendered page, ready to be returned from a handler.
///
/// Carries the `Set-Cookie` instructions queued while rendering (such as the
/// expiry of a consumed flash cookie), so the handler does not need to return
/// its [`CookieJar`] as well.
///
/// # Example
///
/// ```rust,ignore
/// async fn create(State(app): State<App>, mut cookies: CookieJar) -> Result<HtmlPage> {
///     Ok(app
///         .renderer
///         .render(&mut cookies, "users/new.html", None)?
///         .with_status(StatusCode::UNPROCESSABLE_ENTITY))
/// }
/// ```
#[derive(Debug)]
pub struct HtmlPage {
    body: Vec<u8>,
    status: StatusCode,
    headers: Vec<(HeaderName, String)>,
    cookies: Vec<HeaderValue>,
}

impl HtmlPage {
    /// Create a page from rendered output.
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            status: StatusCode::OK,
            headers: Vec::new(),
            cookies: Vec::new(),
        }
    }

    /// Attach the pending cookies of a jar.
    #[must_use]
    pub fn with_cookies(mut self, cookies: &CookieJar) -> Self {
        self.cookies.extend(cookies.set_cookie_values());
        self
    }

    /// Set the HTTP status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a custom header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// The rendered body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The status code that will be sent.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HtmlPage {
    fn into_response(self) -> Response {
        let mut response = (self.status, Html(self.body)).into_response();

        // Add custom headers
        for (name, value) in self.headers {
            if let Ok(value) = HeaderValue::from_str(&value) {
                response.headers_mut().insert(name, value);
            }
        }

        for cookie in self.cookies {
            response.headers_mut().append(SET_COOKIE, cookie);
        }

        response
    }
}
