use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "volunteer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub availability: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::event_request::Entity")]
    EventRequest,
    #[sea_orm(has_many = "super::volunteer_event::Entity")]
    VolunteerEvent,
    #[sea_orm(has_many = "super::volunteer_skill::Entity")]
    VolunteerSkill,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
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
        super::volunteer_skill::Relation::Skill.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::volunteer_skill::Relation::Volunteer.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
