#![allow(dead_code)]

use axum::{Router, http::StatusCode};
use axum_test::{TestResponse, TestServer};
use tower_sessions_sqlx_store::SqliteStore;
use volunteer_hub::{config::Config, database::setup_database, router::create_router};

pub const PASSWORD: &str = "correct horse battery";

/// The full application over a fresh in-memory database.
pub async fn app() -> Router {
    let (db, pool) = setup_database("sqlite::memory:").await.unwrap();
    let session_store = SqliteStore::new(pool);
    session_store.migrate().await.unwrap();
    create_router(db, session_store, &Config::default())
}

/// A browser of its own: every client keeps a separate cookie jar.
pub fn client(app: &Router) -> TestServer {
    TestServer::builder()
        .save_cookies()
        .build(app.clone())
        .unwrap()
}

pub fn assert_redirect(response: &TestResponse, to: &str) {
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), to);
}

pub async fn login(server: &TestServer, email: &str) {
    let response = server
        .post("/login")
        .form(&[("email", email), ("password", PASSWORD)])
        .await;
    assert_redirect(&response, "/");
}

pub async fn volunteer(app: &Router, email: &str, first_name: &str, last_name: &str) -> TestServer {
    let server = client(app);
    let response = server
        .post("/register")
        .form(&[
            ("email", email),
            ("password", PASSWORD),
            ("role", "volunteer"),
            ("first_name", first_name),
            ("last_name", last_name),
            ("date_of_birth", "1990-06-15"),
        ])
        .await;
    assert_redirect(&response, "/login");
    login(&server, email).await;
    server
}

pub async fn organisation(app: &Router, email: &str, name: &str) -> TestServer {
    let server = client(app);
    let response = server
        .post("/register")
        .form(&[
            ("email", email),
            ("password", PASSWORD),
            ("role", "organisation"),
            ("organisation_name", name),
        ])
        .await;
    assert_redirect(&response, "/login");
    login(&server, email).await;
    server
}

/// Posts an event needing the first two skills.
pub async fn create_event(server: &TestServer, title: &str, max_volunteers: &str) {
    let response = server
        .post("/create_event")
        .form(&[
            ("title", title),
            ("description", "Litter picking along the river"),
            ("event_date", "2030-05-01T09:30"),
            ("location", "Riverside"),
            ("max_volunteers", max_volunteers),
            ("skills", "1"),
            ("skills", "2"),
        ])
        .await;
    assert_redirect(&response, "/events");
}

/// Follows up a redirect by loading `path` and returning its body.
pub async fn page(server: &TestServer, path: &str) -> String {
    let response = server.get(path).await;
    response.assert_status_ok();
    response.text()
}
