use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_login::tower_sessions::Session;
use minijinja::context;
use serde::Deserialize;
use tracing::{info, warn};

use super::{
    user::{AuthSession, Credentials},
    viewer::Viewer,
};
use crate::{
    error::AppError,
    flash::{self, Level},
    forms::RegisterForm,
    router::AppState,
    services::accounts,
};

const INVALID_LOGIN: &str = "Invalid email or password. Please try again.";

// This allows us to extract the "next" field from the query string. We use this
// to redirect after log in.
#[derive(Debug, Deserialize)]
pub struct NextUrl {
    next: Option<String>,
}

/// Only same-site paths are followed after login.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|url| url.starts_with('/') && !url.starts_with("//"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(self::get::login).post(self::post::login))
        .route("/logout", get(self::get::logout))
        .route(
            "/register",
            get(self::get::register).post(self::post::register),
        )
}

mod post {
    use super::*;

    pub async fn login(
        mut auth_session: AuthSession,
        session: Session,
        Form(creds): Form<Credentials>,
    ) -> Result<Response, AppError> {
        let next = safe_next(creds.next.as_deref()).map(str::to_string);

        let user = match auth_session.authenticate(creds).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("Failed login attempt");
                let to = match &next {
                    Some(next) => format!("/login?next={next}"),
                    None => "/login".to_string(),
                };
                return flash::redirect(&session, Level::Danger, INVALID_LOGIN, &to).await;
            }
            Err(err) => return Err(anyhow::Error::from(err).into()),
        };

        auth_session
            .login(&user)
            .await
            .map_err(anyhow::Error::from)?;
        info!(user_id = user.id, "User logged in");

        flash::redirect(
            &session,
            Level::Success,
            "Logged in successfully.",
            next.as_deref().unwrap_or("/"),
        )
        .await
    }

    pub async fn register(
        State(state): State<AppState>,
        session: Session,
        Form(form): Form<RegisterForm>,
    ) -> Result<Response, AppError> {
        let outcome = match form.validate() {
            Ok(account) => accounts::register(&state.db, account).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(_) => {
                flash::redirect(
                    &session,
                    Level::Success,
                    "Registration successful! Please log in.",
                    "/login",
                )
                .await
            }
            Err(err) => flash::recover(&session, err, "/register").await,
        }
    }
}

mod get {
    use super::*;

    pub async fn login(
        State(state): State<AppState>,
        auth_session: AuthSession,
        session: Session,
        Query(NextUrl { next }): Query<NextUrl>,
    ) -> Result<Response, AppError> {
        if auth_session.user.is_some() {
            return Ok(Redirect::to("/").into_response());
        }
        let next = safe_next(next.as_deref());
        let page = state
            .render(&session, None, "login.html", context! { next })
            .await?;
        Ok(page.into_response())
    }

    pub async fn register(
        State(state): State<AppState>,
        auth_session: AuthSession,
        session: Session,
    ) -> Result<Response, AppError> {
        let viewer = Viewer::from_session(&state.db, &auth_session).await?;
        let page = state
            .render(&session, viewer.as_ref(), "register.html", context! {})
            .await?;
        Ok(page.into_response())
    }

    pub async fn logout(
        mut auth_session: AuthSession,
        session: Session,
    ) -> Result<Response, AppError> {
        auth_session.logout().await.map_err(anyhow::Error::from)?;
        flash::redirect(&session, Level::Info, "You have been logged out.", "/").await
    }
}

#[cfg(test)]
mod tests {
    use super::safe_next;

    #[test]
    fn only_follows_local_paths() {
        assert_eq!(safe_next(Some("/events")), Some("/events"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(None), None);
    }
}
