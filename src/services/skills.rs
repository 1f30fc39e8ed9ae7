use std::collections::BTreeSet;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use crate::{
    entities::{skill, volunteer_skill},
    error::AppError,
};

/// Most skills a volunteer may hold or an event may require.
pub const MAX_SKILLS: usize = 3;

/// A de-duplicated set of at most [`MAX_SKILLS`] skill ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSelection(Vec<i32>);

impl SkillSelection {
    pub fn new(ids: impl IntoIterator<Item = i32>) -> Result<Self, AppError> {
        let ids: BTreeSet<i32> = ids.into_iter().collect();
        if ids.len() > MAX_SKILLS {
            return Err(AppError::validation(format!(
                "You can select at most {MAX_SKILLS} skills."
            )));
        }
        Ok(Self(ids.into_iter().collect()))
    }

    pub fn ids(&self) -> &[i32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A skill as shown in a checkbox list.
#[derive(Debug, Clone, Serialize)]
pub struct SkillChoice {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub selected: bool,
}

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<skill::Model>, AppError> {
    Ok(skill::Entity::find()
        .order_by_asc(skill::Column::Id)
        .all(db)
        .await?)
}

pub async fn choices<C: ConnectionTrait>(
    db: &C,
    selected: &[i32],
) -> Result<Vec<SkillChoice>, AppError> {
    Ok(all(db)
        .await?
        .into_iter()
        .map(|s| SkillChoice {
            selected: selected.contains(&s.id),
            id: s.id,
            name: s.name,
            description: s.description,
        })
        .collect())
}

pub async fn volunteer_skill_ids<C: ConnectionTrait>(
    db: &C,
    volunteer_id: i32,
) -> Result<Vec<i32>, AppError> {
    Ok(volunteer_skill::Entity::find()
        .filter(volunteer_skill::Column::VolunteerId.eq(volunteer_id))
        .order_by_asc(volunteer_skill::Column::SkillId)
        .all(db)
        .await?
        .into_iter()
        .map(|vs| vs.skill_id)
        .collect())
}

/// Fails unless every selected id names an existing skill.
pub async fn ensure_known<C: ConnectionTrait>(
    db: &C,
    selection: &SkillSelection,
) -> Result<(), AppError> {
    if selection.is_empty() {
        return Ok(());
    }
    let known = skill::Entity::find()
        .filter(skill::Column::Id.is_in(selection.ids().to_vec()))
        .count(db)
        .await?;
    if known as usize != selection.ids().len() {
        return Err(AppError::validation("Unknown skill selected."));
    }
    Ok(())
}

/// Replaces a volunteer's skill set.
pub async fn set_volunteer_skills(
    db: &DatabaseConnection,
    volunteer_id: i32,
    selection: &SkillSelection,
) -> Result<(), AppError> {
    let txn = db.begin().await?;
    ensure_known(&txn, selection).await?;

    volunteer_skill::Entity::delete_many()
        .filter(volunteer_skill::Column::VolunteerId.eq(volunteer_id))
        .exec(&txn)
        .await?;

    if !selection.is_empty() {
        let rows = selection.ids().iter().map(|skill_id| volunteer_skill::ActiveModel {
            volunteer_id: Set(volunteer_id),
            skill_id: Set(*skill_id),
        });
        volunteer_skill::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;
    info!(volunteer_id, skills = ?selection.ids(), "Updated volunteer skills");
    Ok(())
}
