use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "skill")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_skill::Entity")]
    EventSkill,
    #[sea_orm(has_many = "super::volunteer_skill::Entity")]
    VolunteerSkill,
}

impl Related<super::event_skill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventSkill.def()
    }
}

impl Related<super::volunteer_skill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VolunteerSkill.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
