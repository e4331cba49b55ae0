//! Post-redirect-get demo: a form that adds users and reports back with a flash message.
//!
//! Run with:
//!
//! ```sh
//! ACTON_SERVICE__RUN_MODE=dev cargo run --example flash-demo
//! ```
//!
//! then open <http://127.0.0.1:8080>.

use std::sync::Mutex;

use acton_jinja::prelude::*;
use axum::{extract::Path, response::Response, Form};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
struct User {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
    #[serde(rename = "_xsrf", default)]
    xsrf: String,
}

struct App {
    config: Config,
    renderer: Renderer,
    users: Mutex<Vec<User>>,
}

async fn index(State(app): State<Arc<App>>, mut cookies: CookieJar) -> Result<HtmlPage> {
    if let Some(guard) = app.renderer.xsrf() {
        guard.get_or_issue(&mut cookies);
    }

    let users = app
        .users
        .lock()
        .map_err(|_| Error::Internal("user list poisoned".to_string()))?
        .clone();

    let ctx = Context::new().with("name", "World").with("users", users);
    app.renderer.render(&mut cookies, "index.html", Some(ctx))
}

async fn show_user(
    State(app): State<Arc<App>>,
    Path(id): Path<u64>,
    mut cookies: CookieJar,
) -> Result<Response> {
    let user = app
        .users
        .lock()
        .map_err(|_| Error::Internal("user list poisoned".to_string()))?
        .iter()
        .find(|user| user.id == id)
        .cloned();

    let Some(user) = user else {
        let flash = FlashData::new().with(FlashKind::Error, format!("No user #{id}"));
        write_flash(&mut cookies, &app.config.flash, &flash)?;
        return Ok((cookies, Redirect::to("/")).into_response());
    };

    let page = app
        .renderer
        .render(&mut cookies, "users/show.html", Some(Context::new().with("user", user)))?;
    Ok(page.into_response())
}

async fn create_user(
    State(app): State<Arc<App>>,
    mut cookies: CookieJar,
    Form(form): Form<NewUser>,
) -> Result<impl IntoResponse> {
    if let Some(guard) = app.renderer.xsrf() {
        if !guard.verify(&cookies, &form.xsrf) {
            return Err(Error::BadRequest("xsrf token mismatch".to_string()));
        }
    }

    let flash = {
        let mut users = app
            .users
            .lock()
            .map_err(|_| Error::Internal("user list poisoned".to_string()))?;
        let id = users.len() as u64 + 1;
        users.push(User {
            id,
            name: form.name.clone(),
        });
        FlashData::new().with(FlashKind::Success, format!("Added {}", form.name))
    };

    write_flash(&mut cookies, &app.config.flash, &flash)?;
    Ok((cookies, Redirect::to("/")))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    init_tracing(&config)?;

    config.templates.search_path = env!("CARGO_MANIFEST_DIR").into();
    if config.xsrf.secret.is_none() {
        config.xsrf.secret = Some("demo-secret-demo-secret-demo-secret-demo".to_string());
    }

    let renderer = Renderer::builder(&config)
        .route("index", "/")
        .route("user.show", "/users/{id}")
        .route("user.create", "/users")
        .build()?;

    let app = Arc::new(App {
        config,
        renderer,
        users: Mutex::new(Vec::new()),
    });

    let router = Router::new()
        .route("/", get(index))
        .route("/users", post(create_user))
        .route("/users/{id}", get(show_user))
        .with_state(app);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
    tracing::info!("Listening on http://127.0.0.1:8080");
    axum::serve(listener, router).await?;
    Ok(())
}
