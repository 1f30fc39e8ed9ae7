use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub organisation_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub event_date: DateTime,
    pub location: Option<String>,
    pub max_volunteers: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organisation::Entity",
        from = "Column::OrganisationId",
        to = "super::organisation::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Organisation,
    #[sea_orm(has_many = "super::event_request::Entity")]
    EventRequest,
    #[sea_orm(has_many = "super::event_skill::Entity")]
    EventSkill,
    #[sea_orm(has_many = "super::volunteer_event::Entity")]
    VolunteerEvent,
}

impl Related<super::organisation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organisation.def()
    }
}

impl Related<super::event_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventRequest.def()
    }
}

impl Related<super::volunteer_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VolunteerEvent.def()
    }
}

impl Related<super::skill::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_skill::Relation::Skill.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_skill::Relation::Event.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
