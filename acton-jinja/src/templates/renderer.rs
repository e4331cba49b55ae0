//! Template lookup and execution.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use minijinja::{path_loader, Environment, ErrorKind, Template};
use minijinja_autoreload::AutoReloader;

use super::assets::AssetFs;
use super::context::{merge_context, Context};
use super::helpers::{self, RouteTable};
use super::response::HtmlPage;
use crate::config::Config;
use crate::cookies::CookieJar;
use crate::error::{Error, Result};
use crate::session::{read_flash, read_xsrf_token, FlashConfig, XsrfConfig, XsrfGuard};

/// Settings every environment is built from.
struct EngineSettings {
    debug: bool,
    search_path: PathBuf,
    asset_fs: Option<Arc<dyn AssetFs>>,
    routes: Arc<RouteTable>,
}

/// Where compiled templates live.
///
/// Both variants cache compiled templates by path inside MiniJinja; the
/// reloading variant throws the whole cache away when watched files change.
enum Engine {
    Static(Environment<'static>),
    Reloading(AutoReloader),
}

/// Renders templates from `<template_dir>/<name>` with flash and XSRF data merged in.
///
/// Build one per process with [`Renderer::builder`] and share it through
/// axum state.
///
/// # Example
///
/// ```rust,ignore
/// use acton_jinja::prelude::*;
///
/// async fn index(State(renderer): State<Arc<Renderer>>, mut cookies: CookieJar) -> Result<HtmlPage> {
///     renderer.render(&mut cookies, "index.html", Some(Context::new().with("name", "World")))
/// }
/// ```
pub struct Renderer {
    engine: Engine,
    template_dir: String,
    flash: FlashConfig,
    xsrf: Option<XsrfGuard>,
}

impl Renderer {
    /// Start building a renderer from configuration.
    #[must_use]
    pub fn builder(config: &Config) -> RendererBuilder {
        RendererBuilder::from_config(config)
    }

    /// The lookup path for a template name: `<template_dir>/<name>`.
    #[must_use]
    pub fn template_path(&self, name: &str) -> String {
        let dir = self.template_dir.trim_end_matches('/');
        let name = name.trim_start_matches('/');
        if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        }
    }

    /// The XSRF guard, when a secret is configured.
    #[must_use]
    pub fn xsrf(&self) -> Option<&XsrfGuard> {
        self.xsrf.as_ref()
    }

    /// Flash cookie settings used when reading flash data.
    #[must_use]
    pub fn flash_config(&self) -> &FlashConfig {
        &self.flash
    }

    /// Merge the request's XSRF token and flash data into a caller context.
    ///
    /// The flash cookie is consumed only when the caller did not set `flash`.
    pub fn context_for(&self, cookies: &mut CookieJar, ctx: Option<Context>) -> Context {
        let xsrf = read_xsrf_token(cookies, self.xsrf.as_ref());
        merge_context(ctx, xsrf, || read_flash(cookies, &self.flash))
    }

    /// Render a template into an HTML page for the current request.
    ///
    /// The returned page carries any cookie changes made while building the
    /// context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] or [`Error::TemplateSyntax`] when
    /// the lookup fails, and [`Error::Render`] when execution fails.
    pub fn render(
        &self,
        cookies: &mut CookieJar,
        name: &str,
        ctx: Option<Context>,
    ) -> Result<HtmlPage> {
        let mut body = Vec::new();
        self.render_to_write(cookies, name, ctx, &mut body)?;
        Ok(HtmlPage::new(body).with_cookies(cookies))
    }

    /// Render a template for the current request into a writer.
    ///
    /// The flash cookie is left untouched when the lookup fails.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render); write failures surface as
    /// [`Error::Render`].
    pub fn render_to_write<W: io::Write>(
        &self,
        cookies: &mut CookieJar,
        name: &str,
        ctx: Option<Context>,
        writer: W,
    ) -> Result<()> {
        self.with_template(name, |tmpl| {
            let ctx = self.context_for(cookies, ctx);
            tmpl.render_to_write(&ctx, writer).map(|_| ())
        })
    }

    /// Render a template to a string without touching any request state.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render).
    pub fn render_string(&self, name: &str, ctx: Option<Context>) -> Result<String> {
        self.with_template(name, |tmpl| tmpl.render(ctx.unwrap_or_default()))
    }

    fn with_template<R, F>(&self, name: &str, f: F) -> Result<R>
    where
        F: FnOnce(Template<'_, '_>) -> std::result::Result<R, minijinja::Error>,
    {
        let path = self.template_path(name);
        tracing::debug!(template = %path, "Looking up template");

        match &self.engine {
            Engine::Static(env) => execute(env, &path, f),
            Engine::Reloading(reloader) => {
                let env = reloader.acquire_env()?;
                execute(&env, &path, f)
            }
        }
    }
}

fn execute<R, F>(env: &Environment<'static>, path: &str, f: F) -> Result<R>
where
    F: FnOnce(Template<'_, '_>) -> std::result::Result<R, minijinja::Error>,
{
    let tmpl = env
        .get_template(path)
        .map_err(|err| Error::from_lookup(path, err))?;
    f(tmpl).map_err(Error::from)
}

/// Builder for [`Renderer`].
///
/// Holds what used to be process-wide switches: debug mode, template
/// reloading and the asset filesystem.
pub struct RendererBuilder {
    template_dir: String,
    search_path: PathBuf,
    debug: bool,
    auto_reload: bool,
    flash: FlashConfig,
    xsrf: XsrfConfig,
    routes: RouteTable,
    asset_fs: Option<Arc<dyn AssetFs>>,
}

impl RendererBuilder {
    /// Take settings from configuration.
    ///
    /// Dev run mode enables template debugging and, unless configured
    /// otherwise, auto-reload.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            template_dir: config.templates.dir.clone(),
            search_path: config.templates.search_path.clone(),
            debug: config.service.is_dev(),
            auto_reload: config.auto_reload(),
            flash: config.flash.clone(),
            xsrf: config.xsrf.clone(),
            routes: RouteTable::new(),
            asset_fs: None,
        }
    }

    /// Register a named route for `url_for`.
    #[must_use]
    pub fn route(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.routes.insert(name, pattern);
        self
    }

    /// Replace the route table used by `url_for`.
    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Load templates from an asset filesystem instead of `search_path`.
    #[must_use]
    pub fn asset_fs(mut self, fs: impl AssetFs) -> Self {
        self.asset_fs = Some(Arc::new(fs));
        self
    }

    /// Override template debugging.
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Build the renderer.
    ///
    /// # Errors
    ///
    /// Returns an error if the XSRF secret is too short.
    pub fn build(self) -> Result<Renderer> {
        let xsrf = XsrfGuard::from_config(&self.xsrf)?;
        let watch_dir = self.search_path.join(&self.template_dir);
        let reload = self.auto_reload && self.asset_fs.is_none();

        let settings = Arc::new(EngineSettings {
            debug: self.debug,
            search_path: self.search_path,
            asset_fs: self.asset_fs,
            routes: Arc::new(self.routes),
        });

        let engine = if reload {
            tracing::info!(path = %watch_dir.display(), "Template auto-reload enabled");
            Engine::Reloading(AutoReloader::new(move |notifier| {
                notifier.watch_path(&watch_dir, true);
                Ok(create_environment(&settings))
            }))
        } else {
            Engine::Static(create_environment(&settings))
        };

        tracing::info!(
            template_dir = %self.template_dir,
            debug = self.debug,
            xsrf = xsrf.is_some(),
            "Template renderer ready"
        );

        Ok(Renderer {
            engine,
            template_dir: self.template_dir,
            flash: self.flash,
            xsrf,
        })
    }
}

fn create_environment(settings: &EngineSettings) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_debug(settings.debug);

    match &settings.asset_fs {
        Some(fs) => {
            let fs = Arc::clone(fs);
            env.set_loader(move |path| {
                fs.load(path).map_err(|err| {
                    minijinja::Error::new(
                        ErrorKind::InvalidOperation,
                        "could not read template from asset filesystem",
                    )
                    .with_source(err)
                })
            });
        }
        None => env.set_loader(path_loader(settings.search_path.clone())),
    }

    helpers::register(&mut env, Arc::clone(&settings.routes));
    env
}
