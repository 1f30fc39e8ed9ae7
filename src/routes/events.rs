use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_login::tower_sessions::Session;
use minijinja::context;

use crate::{
    auth::{user::AuthSession, viewer::Viewer},
    error::AppError,
    flash,
    forms::{EventForm, SkillFilter},
    router::AppState,
    services::{
        events,
        requests::{self, RequestAction},
        skills,
    },
};

pub async fn list(
    State(state): State<AppState>,
    auth_session: AuthSession,
    session: Session,
    Query(filter): Query<SkillFilter>,
) -> Result<Response, AppError> {
    let viewer = Viewer::from_session(&state.db, &auth_session).await?;
    let selected_skill = filter.skill_id();
    let events = events::list(&state.db, viewer.as_ref(), selected_skill).await?;
    let skills = skills::all(&state.db).await?;

    let page = state
        .render(
            &session,
            viewer.as_ref(),
            "events.html",
            context! { events, skills, selected_skill },
        )
        .await?;
    Ok(page.into_response())
}

pub async fn create_form(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
) -> Result<Response, AppError> {
    if let Err(err) = viewer.organisation() {
        return flash::recover(&session, err, "/").await;
    }
    let skills = skills::all(&state.db).await?;
    let page = state
        .render(
            &session,
            Some(&viewer),
            "create_event.html",
            context! { skills, max_skills => skills::MAX_SKILLS },
        )
        .await?;
    Ok(page.into_response())
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let organisation = match viewer.organisation() {
        Ok(organisation) => organisation,
        Err(err) => return flash::recover(&session, err, "/").await,
    };
    let outcome = match form.validate() {
        Ok(new_event) => events::create(&state.db, organisation.id, new_event).await,
        Err(err) => Err(err),
    };
    match outcome {
        Ok(_) => {
            flash::redirect(
                &session,
                flash::Level::Success,
                "Event created successfully!",
                "/events",
            )
            .await
        }
        Err(err) => flash::recover(&session, err, "/create_event").await,
    }
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    Path(event_id): Path<i32>,
) -> Result<Response, AppError> {
    let outcome = match viewer.organisation() {
        Ok(organisation) => events::delete(&state.db, organisation.id, event_id).await,
        Err(err) => Err(err),
    };
    flash::respond(&session, outcome, "Event deleted.", "/events").await
}

pub async fn join(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    Path(event_id): Path<i32>,
) -> Result<Response, AppError> {
    let outcome = match viewer.volunteer() {
        Ok(volunteer) => requests::submit(&state.db, volunteer.id, event_id).await,
        Err(err) => Err(err),
    };
    flash::respond(
        &session,
        outcome,
        "Your request to join has been sent to the organisation.",
        "/events",
    )
    .await
}

pub async fn manage(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    Path(event_id): Path<i32>,
) -> Result<Response, AppError> {
    let detail = match events::manage(&state.db, &viewer, event_id).await {
        Ok(detail) => detail,
        Err(err) => return flash::recover(&session, err, "/events").await,
    };
    let page = state
        .render(
            &session,
            Some(&viewer),
            "manage_event.html",
            context! { detail },
        )
        .await?;
    Ok(page.into_response())
}

pub async fn handle_request(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    Path((request_id, action)): Path<(i32, String)>,
) -> Result<Response, AppError> {
    let back = match requests::event_id_of(&state.db, request_id).await? {
        Some(event_id) => format!("/manage_event/{event_id}"),
        None => "/events".to_string(),
    };
    let action = match action.as_str() {
        "accept" => RequestAction::Accept,
        "decline" => RequestAction::Decline,
        _ => {
            let err = AppError::validation("Unknown action.");
            return flash::recover(&session, err, &back).await;
        }
    };

    let outcome = match viewer.organisation() {
        Ok(organisation) => {
            requests::resolve(&state.db, organisation.id, request_id, action).await
        }
        Err(err) => Err(err),
    };
    let message = match action {
        RequestAction::Accept => "Request accepted.",
        RequestAction::Decline => "Request declined.",
    };
    // Someone else's event: their manage page would only bounce again.
    let to = match &outcome {
        Err(AppError::Forbidden(_)) => "/events",
        _ => back.as_str(),
    };
    flash::respond(&session, outcome, message, to).await
}
