use axum::response::{IntoResponse, Redirect, Response};
use axum_login::tower_sessions::Session;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const FLASH_KEY: &str = "flash.messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

pub async fn push(session: &Session, level: Level, message: impl Into<String>) -> Result<(), AppError> {
    let mut messages: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    messages.push(Flash {
        level,
        message: message.into(),
    });
    session.insert(FLASH_KEY, messages).await?;
    Ok(())
}

pub async fn take(session: &Session) -> Result<Vec<Flash>, AppError> {
    Ok(session.remove(FLASH_KEY).await?.unwrap_or_default())
}

pub async fn redirect(
    session: &Session,
    level: Level,
    message: impl Into<String>,
    to: &str,
) -> Result<Response, AppError> {
    push(session, level, message).await?;
    Ok(Redirect::to(to).into_response())
}

/// Reports a user-facing failure as a flash message and redirects to `to`.
/// Unauthenticated callers are sent to the login page instead; infrastructure
/// errors are handed back unchanged.
pub async fn recover(session: &Session, err: AppError, to: &str) -> Result<Response, AppError> {
    let Some(level) = err.flash_level() else {
        return Err(err);
    };
    let to = match err {
        AppError::Unauthenticated => "/login",
        _ => to,
    };
    redirect(session, level, err.to_string(), to).await
}

/// Sends the user to `to` with a success message, or reports the failure.
pub async fn respond<T>(
    session: &Session,
    outcome: Result<T, AppError>,
    success: &str,
    to: &str,
) -> Result<Response, AppError> {
    match outcome {
        Ok(_) => redirect(session, Level::Success, success, to).await,
        Err(err) => recover(session, err, to).await,
    }
}
