use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_login::tower_sessions::Session;
use minijinja::context;

use crate::{
    auth::viewer::Viewer,
    error::AppError,
    flash,
    forms::{AccountForm, SkillsForm},
    router::AppState,
    services::{accounts, skills},
};

pub async fn my_account(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
) -> Result<Response, AppError> {
    let account = accounts::account_view(&state.db, &viewer).await?;
    let page = state
        .render(
            &session,
            Some(&viewer),
            "my_account.html",
            context! { account, max_skills => skills::MAX_SKILLS },
        )
        .await?;
    Ok(page.into_response())
}

pub async fn update_account(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    Form(form): Form<AccountForm>,
) -> Result<Response, AppError> {
    let outcome = match form.validate(viewer.role()) {
        Ok(update) => accounts::update_account(&state.db, &viewer, update).await,
        Err(err) => Err(err),
    };
    flash::respond(&session, outcome, "Account updated successfully!", "/my_account").await
}

pub async fn update_skills(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    axum_extra::extract::Form(form): axum_extra::extract::Form<SkillsForm>,
) -> Result<Response, AppError> {
    let outcome = async {
        let volunteer = viewer.volunteer()?;
        let selection = form.validate()?;
        skills::set_volunteer_skills(&state.db, volunteer.id, &selection).await
    }
    .await;
    flash::respond(&session, outcome, "Skills updated.", "/my_account").await
}
