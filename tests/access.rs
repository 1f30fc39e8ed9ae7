mod common;

use common::{PASSWORD, assert_redirect, client, create_event, organisation, page, volunteer};

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login() {
    let app = common::app().await;
    let anonymous = client(&app);

    assert_redirect(&anonymous.get("/my_account").await, "/login");
    assert_redirect(&anonymous.get("/create_event").await, "/login");
    assert_redirect(&anonymous.post("/join_event/1").await, "/login");

    // Public pages still render.
    assert!(page(&anonymous, "/").await.contains("Create an account"));
    assert!(page(&anonymous, "/events").await.contains("No events yet."));
}

#[tokio::test]
async fn directories_are_limited_to_the_other_role() {
    let app = common::app().await;
    let org = organisation(&app, "river@example.org", "River Trust").await;
    let ada = volunteer(&app, "ada@example.org", "Ada", "Lovelace").await;

    assert_redirect(&ada.get("/volunteers").await, "/");
    assert!(page(&ada, "/").await.contains("Access denied."));
    assert!(page(&ada, "/organisations").await.contains("River Trust"));

    assert_redirect(&org.get("/organisations").await, "/");
    assert!(page(&org, "/").await.contains("Access denied."));
    assert!(page(&org, "/volunteers").await.contains("Ada Lovelace"));
}

#[tokio::test]
async fn only_the_owner_manages_an_event() {
    let app = common::app().await;
    let owner = organisation(&app, "river@example.org", "River Trust").await;
    let rival = organisation(&app, "park@example.org", "Park Friends").await;
    let ada = volunteer(&app, "ada@example.org", "Ada", "Lovelace").await;
    create_event(&owner, "River clean-up", "2").await;
    ada.post("/join_event/1").await;

    assert_redirect(&rival.post("/delete_event/1").await, "/events");
    assert_redirect(&rival.get("/manage_event/1").await, "/events");
    assert_redirect(&rival.post("/handle_request/1/accept").await, "/events");
    let listing = page(&rival, "/events").await;
    assert!(listing.contains("Only the organisation that posted this event can manage it."));
    assert!(listing.contains("River clean-up"));

    assert_redirect(&ada.post("/delete_event/1").await, "/events");
    assert!(page(&ada, "/events").await.contains("Access denied."));

    // Volunteers cannot post events either.
    assert_redirect(&ada.get("/create_event").await, "/");

    let manage = page(&owner, "/manage_event/1").await;
    assert!(manage.contains("0 / 2 volunteers"));
    assert!(manage.contains("1 pending"));
}

#[tokio::test]
async fn skill_updates_are_capped() {
    let app = common::app().await;
    let ada = volunteer(&app, "ada@example.org", "Ada", "Lovelace").await;

    let response = ada
        .post("/update_skills")
        .form(&[("skills", "1"), ("skills", "2"), ("skills", "3"), ("skills", "4")])
        .await;
    assert_redirect(&response, "/my_account");
    assert!(page(&ada, "/my_account").await.contains("You can select at most 3 skills."));

    let response = ada
        .post("/update_skills")
        .form(&[("skills", "1"), ("skills", "4")])
        .await;
    assert_redirect(&response, "/my_account");
    let account = page(&ada, "/my_account").await;
    assert!(account.contains("Skills updated."));
    assert_eq!(account.matches("checked>").count(), 2);

    let org = organisation(&app, "river@example.org", "River Trust").await;
    org.post("/create_event")
        .form(&[
            ("title", "Debate night"),
            ("event_date", "2030-06-01T19:00"),
            ("max_volunteers", "4"),
            ("skills", "4"),
        ])
        .await;
    let matching = page(&ada, "/organisations?matching=on").await;
    assert!(matching.contains("River Trust"));
    assert!(matching.contains("looking for Public Speaking"));
}

#[tokio::test]
async fn registration_and_login_failures_are_reported() {
    let app = common::app().await;
    volunteer(&app, "ada@example.org", "Ada", "Lovelace").await;

    let other = client(&app);
    let response = other
        .post("/register")
        .form(&[
            ("email", "ADA@example.org"),
            ("password", PASSWORD),
            ("role", "organisation"),
            ("organisation_name", "Copycats"),
        ])
        .await;
    assert_redirect(&response, "/register");
    assert!(page(&other, "/register").await.contains("That email is already registered."));

    let response = other
        .post("/register")
        .form(&[
            ("email", "short@example.org"),
            ("password", "short"),
            ("role", "volunteer"),
            ("first_name", "Sam"),
            ("last_name", "Short"),
        ])
        .await;
    assert_redirect(&response, "/register");
    assert!(page(&other, "/register").await.contains("Password must be at least 8 characters."));

    let response = other
        .post("/login")
        .form(&[("email", "ada@example.org"), ("password", "wrong password")])
        .await;
    assert_redirect(&response, "/login");
    assert!(page(&other, "/login").await.contains("Invalid email or password. Please try again."));
}

#[tokio::test]
async fn account_details_can_be_updated() {
    let app = common::app().await;
    let ada = volunteer(&app, "ada@example.org", "Ada", "Lovelace").await;

    let response = ada
        .post("/my_account")
        .form(&[
            ("email", "countess@example.org"),
            ("phone_number", "0123 456"),
            ("first_name", "Augusta Ada"),
            ("last_name", "King"),
            ("date_of_birth", "1990-06-15"),
            ("availability", "Evenings"),
        ])
        .await;
    assert_redirect(&response, "/my_account");

    let account = page(&ada, "/my_account").await;
    assert!(account.contains("Account updated successfully!"));
    assert!(account.contains("countess@example.org"));
    assert!(account.contains("Augusta Ada King"));

    let response = ada.get("/logout").await;
    assert_redirect(&response, "/");
    assert_redirect(&ada.get("/my_account").await, "/login");
}
