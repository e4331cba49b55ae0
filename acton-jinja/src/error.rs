//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for template rendering
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// The template could not be found by the engine's loader
    #[error("Template not found: {name}")]
    TemplateNotFound {
        /// Full lookup path, including the template directory
        name: String,
    },

    /// The template was found but failed to compile
    #[error("Template syntax error in {name}: {source}")]
    TemplateSyntax {
        /// Full lookup path, including the template directory
        name: String,
        /// Underlying engine error (carries line information)
        #[source]
        source: Box<minijinja::Error>,
    },

    /// Template execution failed
    #[error("Render error: {0}")]
    Render(Box<minijinja::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify an engine error raised while looking up `name`.
    ///
    /// Lookup compiles the template, so both missing files and syntax
    /// errors surface here; anything else is reported as a render failure.
    pub(crate) fn from_lookup(name: &str, err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::TemplateNotFound => Error::TemplateNotFound {
                name: name.to_string(),
            },
            minijinja::ErrorKind::SyntaxError => Error::TemplateSyntax {
                name: name.to_string(),
                source: Box::new(err),
            },
            _ => Error::Render(Box::new(err)),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Error::Config(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_code(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    e.to_string(),
                ),
            ),
            Error::TemplateNotFound { name } => {
                tracing::error!(template = %name, "Template not found");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "TEMPLATE_NOT_FOUND",
                        "Template not found",
                    ),
                )
            }
            Error::TemplateSyntax { name, source } => {
                tracing::error!(template = %name, error = %source, "Template syntax error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "TEMPLATE_SYNTAX",
                        "Template failed to compile",
                    ),
                )
            }
            Error::Render(e) => {
                tracing::error!("Template rendering error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "RENDER_ERROR",
                        "Template rendering failed",
                    ),
                )
            }
            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "IO_ERROR",
                        "I/O operation failed",
                    ),
                )
            }
            Error::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ),
            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Implement From for boxed error types
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        Error::Render(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_classification() {
        let missing = minijinja::Error::new(minijinja::ErrorKind::TemplateNotFound, "nope");
        assert!(matches!(
            Error::from_lookup("templates/a.html", missing),
            Error::TemplateNotFound { ref name } if name == "templates/a.html"
        ));

        let syntax = minijinja::Error::new(minijinja::ErrorKind::SyntaxError, "bad");
        assert!(matches!(
            Error::from_lookup("templates/a.html", syntax),
            Error::TemplateSyntax { .. }
        ));

        let other = minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, "x");
        assert!(matches!(
            Error::from_lookup("templates/a.html", other),
            Error::Render(_)
        ));
    }

    #[test]
    fn test_error_status_codes() {
        let response = Error::BadRequest("bad flash key".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = Error::TemplateNotFound {
            name: "templates/missing.html".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_body() {
        let body = ErrorResponse::with_code(
            StatusCode::INTERNAL_SERVER_ERROR,
            "TEMPLATE_NOT_FOUND",
            "Template not found",
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "TEMPLATE_NOT_FOUND");
        assert_eq!(json["status"], 500);

        let plain = serde_json::to_value(ErrorResponse::new(StatusCode::BAD_REQUEST, "x")).unwrap();
        assert!(plain.get("code").is_none());
    }
}
