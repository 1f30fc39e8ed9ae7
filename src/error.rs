use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_login::tower_sessions::session;
use sea_orm::DbErr;

use crate::flash::Level;

/// Everything a handler can fail with.
///
/// The first group of variants describe problems the user can fix or should be
/// told about; handlers turn them into a flash message and a redirect (see
/// [`crate::flash::recover`]). The rest are infrastructure failures that end up
/// as a 500 page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Please log in to continue.")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found.")]
    NotFound(&'static str),

    #[error("This event is already full.")]
    CapacityReached,

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Session(#[from] session::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn access_denied() -> Self {
        Self::Forbidden("Access denied.".to_string())
    }

    /// Flash level for errors that are reported back to the user, `None` for
    /// failures that should surface as a server error.
    pub fn flash_level(&self) -> Option<Level> {
        match self {
            Self::Validation(_) | Self::Conflict(_) | Self::NotFound(_) | Self::CapacityReached => {
                Some(Level::Warning)
            }
            Self::Unauthenticated => Some(Level::Info),
            Self::Forbidden(_) => Some(Level::Danger),
            Self::Database(_) | Self::Template(_) | Self::Session(_) | Self::Internal(_) => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) | Self::CapacityReached => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Template(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Unauthenticated) {
            return Redirect::to("/login").into_response();
        }

        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            "Something went wrong on our side. Please try again.".to_string()
        } else {
            self.to_string()
        };

        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>Volunteer Hub</title>
</head>
<body>
    <h1>{}</h1>
    <p>{}</p>
    <a href="/">Back to home</a>
</body>
</html>"#,
            status, message
        );
        (status, Html(body)).into_response()
    }
}

/// True when a database error is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_)))
}
