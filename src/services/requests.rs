//! The event join workflow.
//!
//! A volunteer submits a request, which starts out `pending`; the organisation
//! that owns the event accepts or declines it. Accepting adds the volunteer to
//! the event's attendance. Capacity is checked inside the insert statements
//! themselves, so two concurrent submissions or acceptances cannot push an
//! event past `max_volunteers`.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, Set, Statement, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    entities::{
        event,
        event_request::{self, RequestStatus},
        volunteer_event,
    },
    error::{AppError, is_unique_violation},
    services::events::owned_event,
};

const ALREADY_REQUESTED: &str = "You have already requested to join this event.";

/// Inserts a pending request only while the event has free places.
const SUBMIT_IF_CAPACITY: &str = r#"
INSERT INTO "event_request" ("volunteer_id", "event_id", "status")
SELECT ?, "e"."id", 'pending'
FROM "event" AS "e"
WHERE "e"."id" = ?
  AND (SELECT COUNT(*) FROM "volunteer_event" AS "ve" WHERE "ve"."event_id" = "e"."id")
      < "e"."max_volunteers"
"#;

/// Adds an attendance row unless it already exists or the event is full.
const ATTEND_IF_CAPACITY: &str = r#"
INSERT INTO "volunteer_event" ("volunteer_id", "event_id")
SELECT ?, "e"."id"
FROM "event" AS "e"
WHERE "e"."id" = ?
  AND NOT EXISTS (
      SELECT 1 FROM "volunteer_event" AS "ve"
      WHERE "ve"."event_id" = "e"."id" AND "ve"."volunteer_id" = ?
  )
  AND (SELECT COUNT(*) FROM "volunteer_event" AS "ve" WHERE "ve"."event_id" = "e"."id")
      < "e"."max_volunteers"
"#;

/// What the organisation decided, taken from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Accept,
    Decline,
}

impl RequestStatus {
    /// The status after `action`. Repeating the decision that was already made
    /// is allowed; reversing it is not.
    pub fn apply(self, action: RequestAction) -> Result<RequestStatus, AppError> {
        match (self, action) {
            (Self::Pending | Self::Accepted, RequestAction::Accept) => Ok(Self::Accepted),
            (Self::Pending | Self::Declined, RequestAction::Decline) => Ok(Self::Declined),
            (Self::Declined, RequestAction::Accept) => Err(AppError::conflict(
                "This request has already been declined.",
            )),
            (Self::Accepted, RequestAction::Decline) => Err(AppError::conflict(
                "This request has already been accepted.",
            )),
        }
    }
}

async fn find_request<C: ConnectionTrait>(
    db: &C,
    volunteer_id: i32,
    event_id: i32,
) -> Result<Option<event_request::Model>, AppError> {
    Ok(event_request::Entity::find()
        .filter(event_request::Column::VolunteerId.eq(volunteer_id))
        .filter(event_request::Column::EventId.eq(event_id))
        .one(db)
        .await?)
}

/// The event a request belongs to, if the request exists.
pub async fn event_id_of<C: ConnectionTrait>(
    db: &C,
    request_id: i32,
) -> Result<Option<i32>, AppError> {
    Ok(event_request::Entity::find_by_id(request_id)
        .one(db)
        .await?
        .map(|r| r.event_id))
}

async fn is_attending<C: ConnectionTrait>(
    db: &C,
    volunteer_id: i32,
    event_id: i32,
) -> Result<bool, AppError> {
    Ok(volunteer_event::Entity::find_by_id((volunteer_id, event_id))
        .one(db)
        .await?
        .is_some())
}

/// Asks to join an event on behalf of a volunteer.
pub async fn submit(
    db: &DatabaseConnection,
    volunteer_id: i32,
    event_id: i32,
) -> Result<event_request::Model, AppError> {
    let txn = db.begin().await?;

    event::Entity::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Event"))?;

    if find_request(&txn, volunteer_id, event_id).await?.is_some() {
        debug!(volunteer_id, event_id, "Duplicate join request");
        return Err(AppError::conflict(ALREADY_REQUESTED));
    }

    let inserted = txn
        .execute(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            SUBMIT_IF_CAPACITY,
            [volunteer_id.into(), event_id.into()],
        ))
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::conflict(ALREADY_REQUESTED)
            } else {
                err.into()
            }
        })?;
    if inserted.rows_affected() == 0 {
        debug!(volunteer_id, event_id, "Join request rejected, event full");
        return Err(AppError::CapacityReached);
    }

    let request = find_request(&txn, volunteer_id, event_id)
        .await?
        .ok_or(AppError::NotFound("Request"))?;
    txn.commit().await?;

    info!(request_id = request.id, volunteer_id, event_id, "Join request submitted");
    Ok(request)
}

/// Accepts or declines a request on an event owned by `organisation_id`.
pub async fn resolve(
    db: &DatabaseConnection,
    organisation_id: i32,
    request_id: i32,
    action: RequestAction,
) -> Result<event_request::Model, AppError> {
    let txn = db.begin().await?;

    let request = event_request::Entity::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Request"))?;
    owned_event(&txn, organisation_id, request.event_id).await?;
    let status = request.status.apply(action)?;

    if action == RequestAction::Accept {
        let inserted = txn
            .execute(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                ATTEND_IF_CAPACITY,
                [
                    request.volunteer_id.into(),
                    request.event_id.into(),
                    request.volunteer_id.into(),
                ],
            ))
            .await?;
        if inserted.rows_affected() == 0
            && !is_attending(&txn, request.volunteer_id, request.event_id).await?
        {
            return Err(AppError::CapacityReached);
        }
    }

    let request = if status == request.status {
        request
    } else {
        let mut active: event_request::ActiveModel = request.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().naive_utc());
        active.update(&txn).await?
    };
    txn.commit().await?;

    info!(
        request_id,
        organisation_id,
        status = ?request.status,
        "Join request resolved"
    );
    Ok(request)
}
