use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_login::tower_sessions::Session;
use minijinja::context;

use crate::{
    auth::viewer::Viewer,
    error::AppError,
    flash,
    forms::{OrganisationQuery, SkillFilter},
    router::AppState,
    services::{
        directory::{self, OrganisationFilter},
        skills,
    },
};

/// Organisations browsing volunteers.
pub async fn volunteers(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    Query(filter): Query<SkillFilter>,
) -> Result<Response, AppError> {
    if let Err(err) = viewer.organisation() {
        return flash::recover(&session, err, "/").await;
    }
    let selected_skill = filter.skill_id();
    let volunteers = directory::volunteers(&state.db, selected_skill).await?;
    let skills = skills::all(&state.db).await?;

    let page = state
        .render(
            &session,
            Some(&viewer),
            "volunteers.html",
            context! { volunteers, skills, selected_skill },
        )
        .await?;
    Ok(page.into_response())
}

/// Volunteers browsing organisations.
pub async fn organisations(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    Query(query): Query<OrganisationQuery>,
) -> Result<Response, AppError> {
    let volunteer = match viewer.volunteer() {
        Ok(volunteer) => volunteer,
        Err(err) => return flash::recover(&session, err, "/").await,
    };

    let matching = if query.matching() {
        Some(skills::volunteer_skill_ids(&state.db, volunteer.id).await?)
    } else {
        None
    };
    let filter = OrganisationFilter {
        skill_id: query.skill_id(),
        matching,
    };
    let organisations = directory::organisations(&state.db, &filter).await?;
    let skills = skills::all(&state.db).await?;

    let page = state
        .render(
            &session,
            Some(&viewer),
            "organisations.html",
            context! {
                organisations,
                skills,
                selected_skill => filter.skill_id,
                matching => query.matching(),
            },
        )
        .await?;
    Ok(page.into_response())
}
