use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;

use crate::{
    auth::user::AuthSession,
    entities::{
        organisation,
        user::{self, Role},
        volunteer,
    },
    error::AppError,
    router::AppState,
};

/// The role record that belongs to the logged-in user.
#[derive(Debug, Clone)]
pub enum Profile {
    Volunteer(volunteer::Model),
    Organisation(organisation::Model),
}

/// Identity of the caller for the lifetime of one request.
///
/// Extracting a `Viewer` rejects anonymous requests with
/// [`AppError::Unauthenticated`], which redirects to the login page.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: user::Model,
    pub profile: Profile,
}

/// What templates get to know about the viewer.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerSummary {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub display_name: String,
}

impl Viewer {
    pub async fn load<C: ConnectionTrait>(db: &C, user: user::Model) -> Result<Self, AppError> {
        let profile = match user.role {
            Role::Volunteer => volunteer::Entity::find()
                .filter(volunteer::Column::UserId.eq(user.id))
                .one(db)
                .await?
                .map(Profile::Volunteer),
            Role::Organisation => organisation::Entity::find()
                .filter(organisation::Column::UserId.eq(user.id))
                .one(db)
                .await?
                .map(Profile::Organisation),
        };
        let profile = profile.ok_or(AppError::NotFound("Profile"))?;

        Ok(Self { user, profile })
    }

    /// The viewer behind an auth session, if anyone is logged in.
    pub async fn from_session<C: ConnectionTrait>(
        db: &C,
        auth_session: &AuthSession,
    ) -> Result<Option<Self>, AppError> {
        match auth_session.user.clone() {
            Some(user) => Ok(Some(Self::load(db, user).await?)),
            None => Ok(None),
        }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn volunteer(&self) -> Result<&volunteer::Model, AppError> {
        match &self.profile {
            Profile::Volunteer(volunteer) => Ok(volunteer),
            Profile::Organisation(_) => Err(AppError::access_denied()),
        }
    }

    pub fn organisation(&self) -> Result<&organisation::Model, AppError> {
        match &self.profile {
            Profile::Organisation(organisation) => Ok(organisation),
            Profile::Volunteer(_) => Err(AppError::access_denied()),
        }
    }

    pub fn summary(&self) -> ViewerSummary {
        let display_name = match &self.profile {
            Profile::Volunteer(volunteer) => volunteer.full_name(),
            Profile::Organisation(organisation) => organisation.name.clone(),
        };
        ViewerSummary {
            user_id: self.user.id,
            email: self.user.email.clone(),
            role: self.user.role,
            display_name,
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_session = AuthSession::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthenticated)?;

        Self::from_session(&state.db, &auth_session)
            .await?
            .ok_or(AppError::Unauthenticated)
    }
}
