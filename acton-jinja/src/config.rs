//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `ACTON_`, nested keys split on `__`)
//! 2. A config file (`./config.toml` by default)
//! 3. Default values
//!
//! The resulting [`Config`] is built once at process start and handed to
//! [`RendererBuilder`](crate::templates::RendererBuilder); nothing here is global.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::session::{FlashConfig, XsrfConfig};

/// Run mode that turns on template debugging and auto-reload.
pub const DEV_RUN_MODE: &str = "dev";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Template lookup configuration
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Flash cookie configuration
    #[serde(default)]
    pub flash: FlashConfig,

    /// Anti-forgery token configuration
    #[serde(default)]
    pub xsrf: XsrfConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Run mode (dev, staging, prod)
    #[serde(default = "default_run_mode")]
    pub run_mode: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ServiceConfig {
    /// Whether the service runs in development mode.
    pub fn is_dev(&self) -> bool {
        self.run_mode == DEV_RUN_MODE
    }
}

/// Template lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory segment prepended to every template name.
    ///
    /// Default: `"templates"`
    #[serde(default = "default_template_dir")]
    pub dir: String,

    /// Filesystem root the lookup path is resolved against.
    ///
    /// Default: `"."`
    #[serde(default = "default_search_path")]
    pub search_path: PathBuf,

    /// Rebuild the template cache when files change.
    ///
    /// Defaults to on in dev mode and off otherwise.
    #[serde(default)]
    pub auto_reload: Option<bool>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_template_dir(),
            search_path: default_search_path(),
            auto_reload: None,
        }
    }
}

fn default_run_mode() -> String {
    "prod".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_template_dir() -> String {
    "templates".to_string()
}

fn default_search_path() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load configuration from `./config.toml` and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    pub fn load_from(path: &str) -> Result<Self> {
        tracing::debug!("Loading configuration from: {}", path);

        let config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Load from config file (if exists)
            .merge(Toml::file(path))
            // Override with environment variables
            .merge(Env::prefixed("ACTON_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// Whether the template cache should follow changes on disk.
    pub fn auto_reload(&self) -> bool {
        self.templates.auto_reload.unwrap_or_else(|| self.service.is_dev())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "acton-jinja".to_string(),
                run_mode: default_run_mode(),
                log_level: default_log_level(),
            },
            templates: TemplateConfig::default(),
            flash: FlashConfig::default(),
            xsrf: XsrfConfig::default(),
        }
    }
}
