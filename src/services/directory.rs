use std::collections::{BTreeMap, BTreeSet, HashMap};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::{
    entities::{event, organisation, skill, user, volunteer},
    error::AppError,
    util::dates::{age_on, today},
};

#[derive(Debug, Clone, Serialize)]
pub struct VolunteerListing {
    pub id: i32,
    pub name: String,
    pub age: Option<u32>,
    pub availability: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganisationListing {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub website_url: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub event_count: usize,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrganisationFilter {
    /// Only organisations with an event requiring this skill.
    pub skill_id: Option<i32>,
    /// Only organisations with an event requiring any of these skills.
    pub matching: Option<Vec<i32>>,
}

async fn users_by_id<C: ConnectionTrait>(
    db: &C,
    ids: Vec<i32>,
) -> Result<HashMap<i32, user::Model>, AppError> {
    Ok(user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

/// Volunteers sorted by name, optionally only those holding `skill_id`.
pub async fn volunteers<C: ConnectionTrait>(
    db: &C,
    skill_id: Option<i32>,
) -> Result<Vec<VolunteerListing>, AppError> {
    let rows = volunteer::Entity::find()
        .find_with_related(skill::Entity)
        .all(db)
        .await?;
    let users = users_by_id(db, rows.iter().map(|(v, _)| v.user_id).collect()).await?;
    let today = today();

    let mut listings: Vec<(String, String, VolunteerListing)> = rows
        .into_iter()
        .filter(|(_, skills)| skill_id.is_none_or(|id| skills.iter().any(|s| s.id == id)))
        .map(|(volunteer, mut skills)| {
            skills.sort_by_key(|s| s.id);
            let user = users.get(&volunteer.user_id);
            let listing = VolunteerListing {
                id: volunteer.id,
                name: volunteer.full_name(),
                age: volunteer.date_of_birth.map(|dob| age_on(dob, today)),
                availability: volunteer.availability.clone(),
                email: user.map(|u| u.email.clone()).unwrap_or_default(),
                phone_number: user.and_then(|u| u.phone_number.clone()),
                skills: skills.into_iter().map(|s| s.name).collect(),
            };
            (volunteer.last_name, volunteer.first_name, listing)
        })
        .collect();
    listings.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

    Ok(listings.into_iter().map(|(_, _, listing)| listing).collect())
}

/// Organisations sorted by name with the skills their events ask for.
pub async fn organisations<C: ConnectionTrait>(
    db: &C,
    filter: &OrganisationFilter,
) -> Result<Vec<OrganisationListing>, AppError> {
    let organisations = organisation::Entity::find()
        .order_by_asc(organisation::Column::Name)
        .all(db)
        .await?;
    let events = event::Entity::find()
        .find_with_related(skill::Entity)
        .all(db)
        .await?;
    let users = users_by_id(db, organisations.iter().map(|o| o.user_id).collect()).await?;

    let mut event_counts: HashMap<i32, usize> = HashMap::new();
    let mut required: HashMap<i32, BTreeMap<i32, String>> = HashMap::new();
    for (event, skills) in events {
        *event_counts.entry(event.organisation_id).or_default() += 1;
        let entry = required.entry(event.organisation_id).or_default();
        for skill in skills {
            entry.insert(skill.id, skill.name);
        }
    }

    let wanted: Option<BTreeSet<i32>> = filter
        .matching
        .as_ref()
        .map(|ids| ids.iter().copied().collect());

    let listings = organisations
        .into_iter()
        .filter(|org| {
            let skills = required.get(&org.id);
            let has = |id: &i32| skills.is_some_and(|s| s.contains_key(id));
            filter.skill_id.is_none_or(|id| has(&id))
                && wanted.as_ref().is_none_or(|ids| ids.iter().any(has))
        })
        .map(|org| {
            let user = users.get(&org.user_id);
            OrganisationListing {
                event_count: event_counts.get(&org.id).copied().unwrap_or(0),
                skills: required
                    .get(&org.id)
                    .map(|s| s.values().cloned().collect())
                    .unwrap_or_default(),
                email: user.map(|u| u.email.clone()).unwrap_or_default(),
                phone_number: user.and_then(|u| u.phone_number.clone()),
                id: org.id,
                name: org.name,
                description: org.description,
                address: org.address,
                website_url: org.website_url,
            }
        })
        .collect();

    Ok(listings)
}
