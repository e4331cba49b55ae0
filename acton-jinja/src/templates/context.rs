//! Render context and the merge of request-derived values into it.

use std::collections::BTreeMap;

use minijinja::Value;
use serde::Serialize;

use crate::session::FlashData;

/// Context key holding the anti-forgery token.
pub const XSRF_KEY: &str = "_xsrf";

/// Context key holding flash data.
pub const FLASH_KEY: &str = "flash";

/// Key/value data handed to a template.
///
/// # Example
///
/// ```rust
/// use acton_jinja::templates::Context;
///
/// let ctx = Context::new()
///     .with("name", "world")
///     .with("items", vec![1, 2, 3]);
/// assert!(ctx.contains_key("items"));
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, Value>);

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        self.0.insert(key.into(), Value::from_serialize(&value));
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether a key is set.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the context is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for Context {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Build the context a template is executed with.
///
/// An absent caller context is the same as an empty one. A present token
/// always lands under `_xsrf`, replacing any caller value. `flash` is only
/// filled, by calling `flash`, when the caller did not set it; otherwise
/// the flash cookie is left unread.
pub fn merge_context<F>(ctx: Option<Context>, xsrf: Option<String>, flash: F) -> Context
where
    F: FnOnce() -> FlashData,
{
    let mut ctx = ctx.unwrap_or_default();

    if let Some(token) = xsrf {
        ctx.insert(XSRF_KEY, token);
    }

    if !ctx.contains_key(FLASH_KEY) {
        ctx.insert(FLASH_KEY, flash());
    }

    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_context_gets_flash() {
        let flash: FlashData = [("success", "saved")].into_iter().collect();
        let merged = merge_context(None, None, || flash.clone());

        assert_eq!(merged.len(), 1);
        let value = merged.get(FLASH_KEY).unwrap();
        assert_eq!(
            value.get_attr("success").unwrap().as_str(),
            Some("saved")
        );
    }

    #[test]
    fn test_caller_flash_preserved() {
        let ctx = Context::new().with("flash", "custom");
        let merged = merge_context(Some(ctx), None, || {
            panic!("flash cookie must not be read when caller set flash")
        });
        assert_eq!(merged.get(FLASH_KEY).unwrap().as_str(), Some("custom"));
    }

    #[test]
    fn test_xsrf_overrides_caller_value() {
        let ctx = Context::new().with(XSRF_KEY, "from-caller");
        let merged = merge_context(Some(ctx), Some("tok".to_string()), FlashData::new);
        assert_eq!(merged.get(XSRF_KEY).unwrap().as_str(), Some("tok"));
    }

    #[test]
    fn test_no_token_leaves_caller_xsrf() {
        let ctx = Context::new().with(XSRF_KEY, "from-caller");
        let merged = merge_context(Some(ctx), None, FlashData::new);
        assert_eq!(merged.get(XSRF_KEY).unwrap().as_str(), Some("from-caller"));
    }

    #[test]
    fn test_caller_keys_untouched() {
        let ctx = Context::new().with("name", "world").with("count", 3);
        let merged = merge_context(Some(ctx), Some("t".into()), FlashData::new);
        assert_eq!(merged.get("name").unwrap().as_str(), Some("world"));
        assert_eq!(merged.get("count").unwrap().as_i64(), Some(3));
        assert_eq!(merged.len(), 4);
    }
}
