// Application error taxonomy and HTTP error responder
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use crate::middleware::request_id::current_request_id;

/// Closed set of error kinds. The kind is the only error vocabulary that
/// crosses component boundaries; it alone decides the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invalid,
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    RateLimited,
    Internal,
}

impl ErrorKind {
    /// Stable wire code for the error envelope
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Invalid => "invalid",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Internal => "internal",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Kinded application error with an optional cause chain and structured
/// diagnostic fields. The public message is only ever the outermost kinded
/// message; causes and fields are logged, never serialized to clients.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
    fields: HashMap<String, Value>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
            fields: HashMap::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Wrap a lower-level error, preserving it as the cause chain
    pub fn wrap(
        kind: ErrorKind,
        message: impl Into<String>,
        cause: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: Some(cause.into()),
            fields: HashMap::new(),
        }
    }

    /// Attach a structured diagnostic field. Consumes and returns the error;
    /// the field map is owned per error, so attaching never aliases state with
    /// a previously built error.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Extract the kind from an arbitrary error chain. Walks `source()` until
    /// a kinded ancestor is found, defaulting to `internal`.
    pub fn kind_of(err: &(dyn StdError + 'static)) -> ErrorKind {
        let mut current: Option<&(dyn StdError + 'static)> = Some(err);
        while let Some(e) = current {
            if let Some(app) = e.downcast_ref::<AppError>() {
                return app.kind;
            }
            current = e.source();
        }
        ErrorKind::Internal
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn StdError + 'static))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                AppError::wrap(ErrorKind::NotFound, "record not found", err)
            }
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::wrap(ErrorKind::Conflict, "record already exists", err)
            }
            _ => AppError::wrap(ErrorKind::Internal, "database error", err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = current_request_id().unwrap_or_default();
        let status = self.kind.status();

        // Private detail stays in the logs, correlated by request id
        match self.kind {
            ErrorKind::Internal => tracing::error!(
                request_id = %request_id,
                kind = self.kind.code(),
                cause = ?self.cause,
                fields = ?self.fields,
                "{}", self.message
            ),
            _ => tracing::warn!(
                request_id = %request_id,
                kind = self.kind.code(),
                cause = ?self.cause,
                "{}", self.message
            ),
        }

        let message = if self.message.is_empty() {
            status.canonical_reason().unwrap_or("error").to_string()
        } else {
            self.message
        };

        let body = json!({
            "error": { "code": self.kind.code(), "message": message },
            "requestId": request_id,
        });

        (
            status,
            [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
            body.to_string(),
        )
            .into_response()
    }
}
