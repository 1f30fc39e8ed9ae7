//! Fixtures for service tests: a migrated in-memory database and shortcuts for
//! creating accounts and events.

use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::{
    auth::viewer::Viewer,
    database::connect,
    entities::{event, organisation, user, volunteer},
    services::{
        accounts::{self, NewAccount, NewProfile, OrganisationDetails, VolunteerDetails},
        events::{self, NewEvent},
        skills::SkillSelection,
    },
};

pub async fn database() -> DatabaseConnection {
    connect("sqlite::memory:")
        .await
        .expect("in-memory database should migrate")
}

pub fn volunteer_account(email: &str, date_of_birth: Option<NaiveDate>) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        password: "correct horse battery".to_string(),
        phone_number: None,
        profile: NewProfile::Volunteer(VolunteerDetails {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            date_of_birth,
            availability: Some("Weekends".to_string()),
        }),
    }
}

pub fn organisation_account(email: &str) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        password: "correct horse battery".to_string(),
        phone_number: None,
        profile: NewProfile::Organisation(OrganisationDetails {
            name: format!("Org {email}"),
            description: None,
            address: None,
            website_url: None,
        }),
    }
}

pub async fn viewer(db: &DatabaseConnection, user_id: i32) -> Viewer {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .unwrap()
        .expect("user should exist");
    Viewer::load(db, user).await.unwrap()
}

pub async fn volunteer(
    db: &DatabaseConnection,
    email: &str,
    date_of_birth: Option<NaiveDate>,
) -> volunteer::Model {
    let user = accounts::register(db, volunteer_account(email, date_of_birth))
        .await
        .unwrap();
    viewer(db, user.id).await.volunteer().unwrap().clone()
}

pub async fn organisation(db: &DatabaseConnection, email: &str) -> organisation::Model {
    let user = accounts::register(db, organisation_account(email))
        .await
        .unwrap();
    viewer(db, user.id).await.organisation().unwrap().clone()
}

pub fn new_event(title: &str, max_volunteers: i32, skills: &[i32]) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: Some("Bring gloves".to_string()),
        event_date: NaiveDate::from_ymd_opt(2030, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
        location: Some("Town hall".to_string()),
        max_volunteers,
        skills: SkillSelection::new(skills.iter().copied()).unwrap(),
    }
}

pub async fn event(
    db: &DatabaseConnection,
    organisation_id: i32,
    title: &str,
    max_volunteers: i32,
) -> event::Model {
    events::create(db, organisation_id, new_event(title, max_volunteers, &[]))
        .await
        .unwrap()
}
