//! Asset filesystems that templates can be loaded from instead of disk.

use std::collections::BTreeMap;
use std::io;

/// A read-only source of template files.
///
/// Paths are the full lookup path, e.g. `templates/index.html`.
/// Return `Ok(None)` for a missing file; errors are reported to the
/// caller of the render operation.
pub trait AssetFs: Send + Sync + 'static {
    /// Read a file as UTF-8 text.
    fn load(&self, path: &str) -> io::Result<Option<String>>;
}

/// Templates held in memory, typically embedded with `include_str!`.
///
/// # Example
///
/// ```rust
/// use acton_jinja::templates::{AssetFs, MemoryAssets};
///
/// let assets = MemoryAssets::new()
///     .with_file("templates/index.html", "Hello {{ name }}");
/// assert!(assets.load("templates/index.html").unwrap().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: BTreeMap<String, String>,
}

impl MemoryAssets {
    /// Create an empty asset set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }
}

impl AssetFs for MemoryAssets {
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_assets() {
        let assets = MemoryAssets::new().with_file("templates/a.txt", "A");
        assert_eq!(assets.load("templates/a.txt").unwrap().as_deref(), Some("A"));
        assert_eq!(assets.load("templates/b.txt").unwrap(), None);
    }
}
