//! Template functions registered on every environment.
//!
//! - `url_for(route, key, value, ...)`: build a URL from a named route
//! - `xsrf_field()`: hidden form input carrying `_xsrf`
//! - `pluralize(count, singular, plural)`
//! - `key|flash_class`: CSS class for a flash key (`"error"` → `flash-error`)

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::value::Rest;
use minijinja::{Environment, Error, ErrorKind, State, Value};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::context::XSRF_KEY;
use crate::session::FlashKind;

/// Characters left unescaped in generated path segments and query strings.
const URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Named URL patterns for `url_for`.
///
/// Patterns use axum's `{param}` placeholders; Beego-style `:param`
/// segments are accepted as well.
///
/// # Example
///
/// ```rust
/// use acton_jinja::templates::RouteTable;
///
/// let routes = RouteTable::new().with_route("user.show", "/users/{id}");
/// assert_eq!(
///     routes.url_for("user.show", &[("id", "7"), ("tab", "posts")]).unwrap(),
///     "/users/7?tab=posts"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, String>,
}

impl RouteTable {
    /// Create an empty route table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route, builder style.
    #[must_use]
    pub fn with_route(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.insert(name, pattern);
        self
    }

    /// Register or replace a route.
    pub fn insert(&mut self, name: impl Into<String>, pattern: impl Into<String>) {
        self.routes.insert(name.into(), pattern.into());
    }

    /// Build a URL for a named route.
    ///
    /// Keys may carry a leading `:`. Pairs that match a placeholder fill it,
    /// the rest become the query string in the order given. `{param}` may sit
    /// anywhere inside a segment (`/files/{id}.json`); `:param` must be a
    /// whole segment. Returns `None` for an unknown route or when a
    /// placeholder is left unfilled.
    #[must_use]
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        let pattern = self.routes.get(name)?;
        let mut used = vec![false; params.len()];
        let mut fill = |param: &str, path: &mut String| -> Option<()> {
            let idx = params
                .iter()
                .position(|(key, _)| key.trim_start_matches(':') == param)?;
            used[idx] = true;
            path.extend(utf8_percent_encode(params[idx].1, URL_SAFE));
            Some(())
        };

        let mut path = String::with_capacity(pattern.len());
        for (i, segment) in pattern.split('/').enumerate() {
            if i > 0 {
                path.push('/');
            }
            if let Some(param) = segment.strip_prefix(':') {
                fill(param, &mut path)?;
                continue;
            }

            let mut rest = segment;
            while let Some(start) = rest.find('{') {
                let Some(len) = rest[start..].find('}') else {
                    break;
                };
                path.push_str(&rest[..start]);
                fill(&rest[start + 1..start + len], &mut path)?;
                rest = &rest[start + len + 1..];
            }
            path.push_str(rest);
        }

        let query: Vec<String> = params
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|((key, value), _)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key.trim_start_matches(':'), URL_SAFE),
                    utf8_percent_encode(value, URL_SAFE)
                )
            })
            .collect();

        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.join("&"));
        }
        Some(path)
    }
}

/// Register the helper functions on an environment.
pub(crate) fn register(env: &mut Environment<'static>, routes: Arc<RouteTable>) {
    env.add_function("url_for", move |name: String, args: Rest<String>| {
        url_for(&routes, &name, &args)
    });
    env.add_function("xsrf_field", xsrf_field);
    env.add_function("pluralize", pluralize);
    env.add_filter("flash_class", flash_class);
}

fn url_for(routes: &RouteTable, name: &str, args: &[String]) -> Result<Value, Error> {
    if args.len() % 2 != 0 {
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            "url_for expects key/value pairs after the route name",
        ));
    }

    let params: Vec<(&str, &str)> = args
        .chunks(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect();

    // parameters are percent-encoded, so the URL is safe to emit unescaped
    routes
        .url_for(name, &params)
        .map(Value::from_safe_string)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to generate url for route {name:?}"),
            )
        })
}

fn xsrf_field(state: &State) -> Value {
    let token = state
        .lookup(XSRF_KEY)
        .filter(|value| !value.is_undefined() && !value.is_none())
        .map(|value| value.to_string());

    match token {
        Some(token) => Value::from_safe_string(format!(
            r#"<input type="hidden" name="{}" value="{}">"#,
            XSRF_KEY,
            html_escape(&token)
        )),
        None => Value::from(""),
    }
}

fn pluralize(count: i64, singular: String, plural: String) -> String {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Unknown keys are styled like notices.
fn flash_class(key: String) -> &'static str {
    FlashKind::from_key(&key)
        .unwrap_or(FlashKind::Notice)
        .css_class()
}

/// Basic HTML escaping for attribute values.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
