use std::collections::HashMap;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use serde::Serialize;
use tracing::info;

use crate::{
    auth::viewer::{Profile, Viewer},
    entities::{
        event,
        event_request::{self, RequestStatus},
        event_skill, organisation, skill, user, volunteer, volunteer_event,
    },
    error::AppError,
    services::skills::{self, SkillSelection},
    util::dates::{DISPLAY_DATE, DISPLAY_DATE_TIME, age_on, average_age, today},
};

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDateTime,
    pub location: Option<String>,
    pub max_volunteers: i32,
    pub skills: SkillSelection,
}

/// One row of the event listing.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[serde(skip)]
    pub starts_at: NaiveDateTime,
    pub date: String,
    pub location: Option<String>,
    pub organisation_id: i32,
    pub organisation_name: String,
    pub skills: Vec<String>,
    pub attendees: u64,
    pub max_volunteers: i32,
    pub is_full: bool,
    pub is_owner: bool,
    pub request_status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestRow {
    pub id: i32,
    pub volunteer_name: String,
    pub email: String,
    pub age: Option<u32>,
    pub status: RequestStatus,
    pub requested_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendeeRow {
    pub volunteer_name: String,
    pub email: String,
    pub age: Option<u32>,
    pub signed_up: String,
}

/// Everything the owning organisation sees on the manage page.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    pub event: EventSummary,
    pub requests: Vec<RequestRow>,
    pub attendees: Vec<AttendeeRow>,
    pub pending: usize,
    pub average_age: Option<f64>,
}

pub async fn create(
    db: &DatabaseConnection,
    organisation_id: i32,
    new_event: NewEvent,
) -> Result<event::Model, AppError> {
    let txn = db.begin().await?;
    skills::ensure_known(&txn, &new_event.skills).await?;

    let event = event::ActiveModel {
        organisation_id: Set(organisation_id),
        title: Set(new_event.title),
        description: Set(new_event.description),
        event_date: Set(new_event.event_date),
        location: Set(new_event.location),
        max_volunteers: Set(new_event.max_volunteers),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if !new_event.skills.is_empty() {
        let rows = new_event
            .skills
            .ids()
            .iter()
            .map(|skill_id| event_skill::ActiveModel {
                event_id: Set(event.id),
                skill_id: Set(*skill_id),
            });
        event_skill::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;
    info!(event_id = event.id, organisation_id, "Created event");
    Ok(event)
}

/// Loads an event and checks that `organisation_id` owns it.
pub async fn owned_event<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
    event_id: i32,
) -> Result<event::Model, AppError> {
    let event = event::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Event"))?;
    if event.organisation_id != organisation_id {
        return Err(AppError::Forbidden(
            "Only the organisation that posted this event can manage it.".to_string(),
        ));
    }
    Ok(event)
}

pub async fn delete(
    db: &DatabaseConnection,
    organisation_id: i32,
    event_id: i32,
) -> Result<(), AppError> {
    let txn = db.begin().await?;
    let event = owned_event(&txn, organisation_id, event_id).await?;
    event::Entity::delete_by_id(event.id).exec(&txn).await?;
    txn.commit().await?;
    info!(event_id, organisation_id, "Deleted event");
    Ok(())
}

pub async fn attendee_count<C: ConnectionTrait>(db: &C, event_id: i32) -> Result<u64, AppError> {
    Ok(volunteer_event::Entity::find()
        .filter(volunteer_event::Column::EventId.eq(event_id))
        .count(db)
        .await?)
}

async fn attendee_counts<C: ConnectionTrait>(db: &C) -> Result<HashMap<i32, u64>, AppError> {
    let rows: Vec<(i32, i64)> = volunteer_event::Entity::find()
        .select_only()
        .column(volunteer_event::Column::EventId)
        .column_as(Expr::col(volunteer_event::Column::VolunteerId).count(), "attendees")
        .group_by(volunteer_event::Column::EventId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(event_id, count)| (event_id, count.max(0) as u64))
        .collect())
}

fn summarise(
    event: event::Model,
    organisation_name: String,
    skills: Vec<String>,
    attendees: u64,
    viewer: Option<&Viewer>,
    request_status: Option<RequestStatus>,
) -> EventSummary {
    let is_owner = matches!(
        viewer.map(|v| &v.profile),
        Some(Profile::Organisation(org)) if org.id == event.organisation_id
    );
    EventSummary {
        id: event.id,
        starts_at: event.event_date,
        date: event.event_date.format(DISPLAY_DATE_TIME).to_string(),
        is_full: attendees >= event.max_volunteers.max(0) as u64,
        title: event.title,
        description: event.description,
        location: event.location,
        organisation_id: event.organisation_id,
        organisation_name,
        skills,
        attendees,
        max_volunteers: event.max_volunteers,
        is_owner,
        request_status,
    }
}

/// All events, soonest first, optionally only those requiring `skill_id`.
pub async fn list<C: ConnectionTrait>(
    db: &C,
    viewer: Option<&Viewer>,
    skill_id: Option<i32>,
) -> Result<Vec<EventSummary>, AppError> {
    let events = event::Entity::find()
        .order_by_asc(event::Column::EventDate)
        .find_with_related(skill::Entity)
        .all(db)
        .await?;

    let organisations: HashMap<i32, String> = organisation::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|o| (o.id, o.name))
        .collect();
    let counts = attendee_counts(db).await?;

    let statuses: HashMap<i32, RequestStatus> = match viewer.map(|v| &v.profile) {
        Some(Profile::Volunteer(volunteer)) => event_request::Entity::find()
            .filter(event_request::Column::VolunteerId.eq(volunteer.id))
            .all(db)
            .await?
            .into_iter()
            .map(|r| (r.event_id, r.status))
            .collect(),
        _ => HashMap::new(),
    };

    let mut summaries: Vec<EventSummary> = events
        .into_iter()
        .filter(|(_, required)| skill_id.is_none_or(|id| required.iter().any(|s| s.id == id)))
        .map(|(event, required)| {
            let organisation_name = organisations
                .get(&event.organisation_id)
                .cloned()
                .unwrap_or_default();
            let attendees = counts.get(&event.id).copied().unwrap_or(0);
            let status = statuses.get(&event.id).copied();
            let skills = required.into_iter().map(|s| s.name).collect();
            summarise(event, organisation_name, skills, attendees, viewer, status)
        })
        .collect();
    // find_with_related groups by primary key, so restore date order.
    summaries.sort_by_key(|s| (s.starts_at, s.id));
    Ok(summaries)
}

/// Requests and attendees of an event, for its owner only.
pub async fn manage<C: ConnectionTrait>(
    db: &C,
    viewer: &Viewer,
    event_id: i32,
) -> Result<EventDetail, AppError> {
    let organisation = viewer.organisation()?;
    let event = owned_event(db, organisation.id, event_id).await?;

    let required: Vec<String> = event
        .find_related(skill::Entity)
        .order_by_asc(skill::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();

    let requests = event_request::Entity::find()
        .filter(event_request::Column::EventId.eq(event.id))
        .order_by_asc(event_request::Column::CreatedAt)
        .find_also_related(volunteer::Entity)
        .all(db)
        .await?;
    let attendance = volunteer_event::Entity::find()
        .filter(volunteer_event::Column::EventId.eq(event.id))
        .order_by_asc(volunteer_event::Column::SignupDate)
        .find_also_related(volunteer::Entity)
        .all(db)
        .await?;

    let user_ids: Vec<i32> = requests
        .iter()
        .filter_map(|(_, v)| v.as_ref().map(|v| v.user_id))
        .chain(attendance.iter().filter_map(|(_, v)| v.as_ref().map(|v| v.user_id)))
        .collect();
    let emails: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.email))
        .collect();

    let today = today();
    let describe = |v: &volunteer::Model| {
        (
            v.full_name(),
            emails.get(&v.user_id).cloned().unwrap_or_default(),
            v.date_of_birth.map(|dob| age_on(dob, today)),
        )
    };

    let requests: Vec<RequestRow> = requests
        .into_iter()
        .filter_map(|(request, volunteer)| {
            let (volunteer_name, email, age) = describe(volunteer.as_ref()?);
            Some(RequestRow {
                id: request.id,
                volunteer_name,
                email,
                age,
                status: request.status,
                requested_at: request.created_at.format(DISPLAY_DATE).to_string(),
            })
        })
        .collect();
    let attendees: Vec<AttendeeRow> = attendance
        .into_iter()
        .filter_map(|(attendance, volunteer)| {
            let (volunteer_name, email, age) = describe(volunteer.as_ref()?);
            Some(AttendeeRow {
                volunteer_name,
                email,
                age,
                signed_up: attendance.signup_date.format(DISPLAY_DATE).to_string(),
            })
        })
        .collect();

    let pending = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .count();
    let average_age = average_age(attendees.iter().filter_map(|a| a.age));
    let summary = summarise(
        event,
        organisation.name.clone(),
        required,
        attendees.len() as u64,
        Some(viewer),
        None,
    );

    Ok(EventDetail {
        event: summary,
        requests,
        attendees,
        pending,
        average_age,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{requests, testing};
    use chrono::{Datelike, NaiveDate};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn creates_event_with_required_skills() {
        let db = testing::database().await;
        let org = testing::organisation(&db, "org@example.org").await;

        let event = create(&db, org.id, testing::new_event("Beach clean", 5, &[1, 4]))
            .await
            .unwrap();

        let listed = list(&db, None, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, event.id);
        assert_eq!(listed[0].skills, vec!["Endurance", "Public Speaking"]);
        assert_eq!(listed[0].attendees, 0);
        assert!(!listed[0].is_full);
    }

    #[tokio::test]
    async fn unknown_skill_rolls_back_event() {
        let db = testing::database().await;
        let org = testing::organisation(&db, "org@example.org").await;

        let err = create(&db, org.id, testing::new_event("Beach clean", 5, &[42]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(list(&db, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_filters_by_skill_and_marks_ownership() {
        let db = testing::database().await;
        let org = testing::organisation(&db, "org@example.org").await;
        let other = testing::organisation(&db, "other@example.org").await;
        create(&db, org.id, testing::new_event("Talks", 5, &[3, 4]))
            .await
            .unwrap();
        create(&db, other.id, testing::new_event("Run", 5, &[1]))
            .await
            .unwrap();

        let viewer = testing::viewer(&db, org.user_id).await;
        let all = list(&db, Some(&viewer), None).await.unwrap();
        let owned: Vec<&str> = all
            .iter()
            .filter(|e| e.is_owner)
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(owned, vec!["Talks"]);

        let running = list(&db, None, Some(1)).await.unwrap();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].title, "Run");
    }

    #[tokio::test]
    async fn only_owner_can_delete() {
        let db = testing::database().await;
        let org = testing::organisation(&db, "org@example.org").await;
        let other = testing::organisation(&db, "other@example.org").await;
        let event = testing::event(&db, org.id, "Beach clean", 2).await;

        let err = delete(&db, other.id, event.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(list(&db, None, None).await.unwrap().len(), 1);

        delete(&db, org.id, event.id).await.unwrap();
        assert!(list(&db, None, None).await.unwrap().is_empty());

        let err = delete(&db, org.id, event.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_event_removes_requests_and_attendance() {
        let db = testing::database().await;
        let org = testing::organisation(&db, "org@example.org").await;
        let volunteer = testing::volunteer(&db, "ada@example.org", None).await;
        let event = testing::event(&db, org.id, "Beach clean", 2).await;
        let request = requests::submit(&db, volunteer.id, event.id).await.unwrap();
        requests::resolve(&db, org.id, request.id, requests::RequestAction::Accept)
            .await
            .unwrap();

        delete(&db, org.id, event.id).await.unwrap();

        assert_eq!(event_request::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(volunteer_event::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn manage_reports_attendees_and_average_age() {
        let db = testing::database().await;
        let org = testing::organisation(&db, "org@example.org").await;
        let event = testing::event(&db, org.id, "Beach clean", 3).await;

        let this_year = today().year();
        let born = |age: i32| NaiveDate::from_ymd_opt(this_year - age, 1, 1);
        let young = testing::volunteer(&db, "young@example.org", born(20)).await;
        let older = testing::volunteer(&db, "older@example.org", born(41)).await;
        let unknown = testing::volunteer(&db, "unknown@example.org", None).await;
        for volunteer in [&young, &older, &unknown] {
            let request = requests::submit(&db, volunteer.id, event.id).await.unwrap();
            if volunteer.id != unknown.id {
                requests::resolve(&db, org.id, request.id, requests::RequestAction::Accept)
                    .await
                    .unwrap();
            }
        }

        let viewer = testing::viewer(&db, org.user_id).await;
        let detail = manage(&db, &viewer, event.id).await.unwrap();

        assert_eq!(detail.requests.len(), 3);
        assert_eq!(detail.pending, 1);
        assert_eq!(detail.attendees.len(), 2);
        assert_eq!(detail.event.attendees, 2);
        assert_eq!(detail.average_age, Some(30.5));
    }

    #[tokio::test]
    async fn manage_rejects_other_organisations_and_volunteers() {
        let db = testing::database().await;
        let org = testing::organisation(&db, "org@example.org").await;
        let other = testing::organisation(&db, "other@example.org").await;
        let volunteer = testing::volunteer(&db, "ada@example.org", None).await;
        let event = testing::event(&db, org.id, "Beach clean", 3).await;

        let outsider = testing::viewer(&db, other.user_id).await;
        let err = manage(&db, &outsider, event.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let volunteer = testing::viewer(&db, volunteer.user_id).await;
        let err = manage(&db, &volunteer, event.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
