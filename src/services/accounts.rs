use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Serialize;
use tokio::task;
use tracing::info;

use crate::{
    auth::{
        password::hash_password,
        viewer::{Profile, Viewer},
    },
    entities::{
        organisation,
        user::{self, Role},
        volunteer,
    },
    error::{AppError, is_unique_violation},
    services::skills::{self, SkillChoice},
    util::dates::{DISPLAY_DATE, age_on, today},
};

const DUPLICATE_EMAIL: &str = "That email is already registered.";

#[derive(Debug, Clone)]
pub struct VolunteerDetails {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub availability: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrganisationDetails {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Debug, Clone)]
pub enum NewProfile {
    Volunteer(VolunteerDetails),
    Organisation(OrganisationDetails),
}

impl NewProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Volunteer(_) => Role::Volunteer,
            Self::Organisation(_) => Role::Organisation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub profile: NewProfile,
}

#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub email: String,
    pub phone_number: Option<String>,
    pub profile: NewProfile,
}

/// Everything the account page shows.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub user: user::Model,
    pub member_since: String,
    pub volunteer: Option<volunteer::Model>,
    pub age: Option<u32>,
    pub organisation: Option<organisation::Model>,
    pub skills: Vec<SkillChoice>,
}

fn map_duplicate_email(err: sea_orm::DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::conflict(DUPLICATE_EMAIL)
    } else {
        err.into()
    }
}

/// Creates the user row and its role record in one transaction.
pub async fn register(db: &DatabaseConnection, account: NewAccount) -> Result<user::Model, AppError> {
    let NewAccount {
        email,
        password,
        phone_number,
        profile,
    } = account;

    let password_hash = task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(anyhow::Error::from)??;

    let txn = db.begin().await?;

    let user = user::ActiveModel {
        email: Set(email),
        password_hash: Set(password_hash),
        phone_number: Set(phone_number),
        role: Set(profile.role()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(map_duplicate_email)?;

    match profile {
        NewProfile::Volunteer(details) => {
            volunteer::ActiveModel {
                user_id: Set(user.id),
                first_name: Set(details.first_name),
                last_name: Set(details.last_name),
                date_of_birth: Set(details.date_of_birth),
                availability: Set(details.availability),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        NewProfile::Organisation(details) => {
            organisation::ActiveModel {
                user_id: Set(user.id),
                name: Set(details.name),
                description: Set(details.description),
                address: Set(details.address),
                website_url: Set(details.website_url),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    info!(user_id = user.id, role = ?user.role, "Registered new user");
    Ok(user)
}

/// Updates contact details and the role profile of the viewer.
pub async fn update_account(
    db: &DatabaseConnection,
    viewer: &Viewer,
    update: AccountUpdate,
) -> Result<(), AppError> {
    if update.profile.role() != viewer.role() {
        return Err(AppError::access_denied());
    }
    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;

    let mut user: user::ActiveModel = viewer.user.clone().into();
    user.email = Set(update.email);
    user.phone_number = Set(update.phone_number);
    user.updated_at = Set(now);
    user.update(&txn).await.map_err(map_duplicate_email)?;

    match (&viewer.profile, update.profile) {
        (Profile::Volunteer(existing), NewProfile::Volunteer(details)) => {
            let mut volunteer: volunteer::ActiveModel = existing.clone().into();
            volunteer.first_name = Set(details.first_name);
            volunteer.last_name = Set(details.last_name);
            volunteer.date_of_birth = Set(details.date_of_birth);
            volunteer.availability = Set(details.availability);
            volunteer.updated_at = Set(now);
            volunteer.update(&txn).await?;
        }
        (Profile::Organisation(existing), NewProfile::Organisation(details)) => {
            let mut organisation: organisation::ActiveModel = existing.clone().into();
            organisation.name = Set(details.name);
            organisation.description = Set(details.description);
            organisation.address = Set(details.address);
            organisation.website_url = Set(details.website_url);
            organisation.updated_at = Set(now);
            organisation.update(&txn).await?;
        }
        _ => return Err(AppError::access_denied()),
    }

    txn.commit().await?;
    info!(user_id = viewer.user.id, "Updated account");
    Ok(())
}

pub async fn account_view<C: ConnectionTrait>(db: &C, viewer: &Viewer) -> Result<AccountView, AppError> {
    let member_since = viewer.user.created_at.format(DISPLAY_DATE).to_string();
    let view = match &viewer.profile {
        Profile::Volunteer(volunteer) => {
            let selected = skills::volunteer_skill_ids(db, volunteer.id).await?;
            AccountView {
                user: viewer.user.clone(),
                member_since,
                age: volunteer.date_of_birth.map(|dob| age_on(dob, today())),
                volunteer: Some(volunteer.clone()),
                organisation: None,
                skills: skills::choices(db, &selected).await?,
            }
        }
        Profile::Organisation(organisation) => AccountView {
            user: viewer.user.clone(),
            member_since,
            volunteer: None,
            age: None,
            organisation: Some(organisation.clone()),
            skills: Vec::new(),
        },
    };
    Ok(view)
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>, AppError> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;
    use pretty_assertions::assert_eq;
    use sea_orm::{EntityTrait, PaginatorTrait};

    #[tokio::test]
    async fn registers_volunteer_with_profile() {
        let db = testing::database().await;
        let user = register(&db, testing::volunteer_account("ada@example.org", None))
            .await
            .unwrap();

        assert_eq!(user.role, Role::Volunteer);
        assert_ne!(user.password_hash, "correct horse battery");
        let viewer = Viewer::load(&db, user).await.unwrap();
        assert_eq!(viewer.volunteer().unwrap().full_name(), "Ada Lovelace");
        assert!(viewer.organisation().is_err());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_and_leaves_no_rows() {
        let db = testing::database().await;
        register(&db, testing::volunteer_account("ada@example.org", None))
            .await
            .unwrap();

        let err = register(&db, testing::organisation_account("ada@example.org"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), DUPLICATE_EMAIL);
        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(organisation::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn updates_contact_details_and_profile() {
        let db = testing::database().await;
        let org = testing::organisation(&db, "org@example.org").await;
        let viewer = testing::viewer(&db, org.user_id).await;

        let update = AccountUpdate {
            email: "hello@example.org".into(),
            phone_number: Some("0123 456".into()),
            profile: NewProfile::Organisation(OrganisationDetails {
                name: "Harbour Trust".into(),
                description: Some("Looking after the harbour".into()),
                address: None,
                website_url: Some("https://harbour.example.org".into()),
            }),
        };
        update_account(&db, &viewer, update).await.unwrap();

        let viewer = testing::viewer(&db, org.user_id).await;
        assert_eq!(viewer.user.email, "hello@example.org");
        assert_eq!(viewer.user.phone_number.as_deref(), Some("0123 456"));
        assert_eq!(viewer.organisation().unwrap().name, "Harbour Trust");
        assert!(find_by_email(&db, "HELLO@example.org").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_a_user_removes_the_role_record() {
        let db = testing::database().await;
        let volunteer = testing::volunteer(&db, "ada@example.org", None).await;

        user::Entity::delete_by_id(volunteer.user_id)
            .exec(&db)
            .await
            .unwrap();

        assert_eq!(volunteer::Entity::find().count(&db).await.unwrap(), 0);
    }
}
