use crate::{
    auth::{
        router as auth_router,
        user::{AuthSession, Backend},
        viewer::Viewer,
    },
    config::Config,
    error::AppError,
    flash,
    routes::{account, directory, events},
    util::asset_loader::AssetLoader,
};
use axum::{
    Router,
    extract::State,
    response::Html,
    routing::{get, get_service, post},
};
use axum_login::{
    AuthManagerLayerBuilder,
    tower_sessions::{
        Expiry, Session, SessionManagerLayer,
        cookie::{SameSite, time},
    },
};
use minijinja::{Environment, Value, context};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::{signal, task::AbortHandle};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions_sqlx_store::SqliteStore;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub templates: Arc<Environment<'static>>,
}

impl AppState {
    /// Renders a page with the pending flash messages and the viewer merged
    /// into `ctx`.
    pub async fn render(
        &self,
        session: &Session,
        viewer: Option<&Viewer>,
        name: &str,
        ctx: Value,
    ) -> Result<Html<String>, AppError> {
        let flashes = flash::take(session).await?;
        let tmpl = self.templates.get_template(name)?;
        let html = tmpl.render(context! {
            flashes,
            viewer => viewer.map(Viewer::summary),
            ..ctx
        })?;
        Ok(Html(html))
    }
}

pub fn create_router(
    db: DatabaseConnection,
    session_store: SqliteStore,
    config: &Config,
) -> Router {
    let templates = setup_templates(config);

    let state = AppState {
        db: db.clone(),
        templates: Arc::new(templates),
    };

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.session_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(1)));

    // Auth service.
    //
    // This combines the session layer with our backend to establish the auth
    // service which will provide the auth session as a request extension.
    let backend = Backend::new(db);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    Router::new()
        .route("/", get(index))
        .route(
            "/my_account",
            get(account::my_account).post(account::update_account),
        )
        .route("/update_skills", post(account::update_skills))
        .route("/volunteers", get(directory::volunteers))
        .route("/organisations", get(directory::organisations))
        .route("/events", get(events::list))
        .route(
            "/create_event",
            get(events::create_form).post(events::create),
        )
        .route("/delete_event/{event_id}", post(events::delete))
        .route("/join_event/{event_id}", post(events::join))
        .route("/manage_event/{event_id}", get(events::manage))
        .route(
            "/handle_request/{request_id}/{action}",
            post(events::handle_request),
        )
        .merge(auth_router::router())
        .with_state(state)
        .nest_service(
            "/static",
            get_service(ServeDir::new(&config.static_dir)),
        )
        .layer(auth_layer)
        .layer(TraceLayer::new_for_http())
}

fn setup_templates(config: &Config) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(&config.template_dir));
    AssetLoader::new(&config.static_dir).register(&mut env);
    env
}

async fn index(
    State(state): State<AppState>,
    auth_session: AuthSession,
    session: Session,
) -> Result<Html<String>, AppError> {
    let viewer = Viewer::from_session(&state.db, &auth_session).await?;
    state
        .render(&session, viewer.as_ref(), "index.html", context! {})
        .await
}

pub async fn shutdown_signal(deletion_task_abort_handle: AbortHandle) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down");
    deletion_task_abort_handle.abort();
}
