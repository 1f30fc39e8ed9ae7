use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Event Table
        let table = table_auto(Event::Table)
            .col(pk_auto(Event::Id))
            .col(integer(Event::OrganisationId))
            .col(string(Event::Title))
            .col(text_null(Event::Description))
            .col(date_time(Event::EventDate))
            .col(string_null(Event::Location))
            .col(integer(Event::MaxVolunteers))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_event_organisation")
                    .from(Event::Table, Event::OrganisationId)
                    .to(Organisation::Table, Organisation::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .check(Expr::col(Event::MaxVolunteers).gte(1))
            .to_owned();
        manager.create_table(table).await?;

        // Create EventSkill Table
        let table = Table::create()
            .table(EventSkill::Table)
            .if_not_exists()
            .col(integer(EventSkill::EventId))
            .col(integer(EventSkill::SkillId))
            .primary_key(
                Index::create()
                    .col(EventSkill::EventId)
                    .col(EventSkill::SkillId),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_event_skill_event")
                    .from(EventSkill::Table, EventSkill::EventId)
                    .to(Event::Table, Event::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_event_skill_skill")
                    .from(EventSkill::Table, EventSkill::SkillId)
                    .to(Skill::Table, Skill::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create EventRequest Table
        let table = table_auto(EventRequest::Table)
            .col(pk_auto(EventRequest::Id))
            .col(integer(EventRequest::VolunteerId))
            .col(integer(EventRequest::EventId))
            .col(string_len(EventRequest::Status, 16).default("pending"))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_event_request_volunteer")
                    .from(EventRequest::Table, EventRequest::VolunteerId)
                    .to(Volunteer::Table, Volunteer::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_event_request_event")
                    .from(EventRequest::Table, EventRequest::EventId)
                    .to(Event::Table, Event::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .check(Expr::col(EventRequest::Status).is_in(["pending", "accepted", "declined"]))
            .to_owned();
        manager.create_table(table).await?;

        // Create VolunteerEvent Table
        let table = Table::create()
            .table(VolunteerEvent::Table)
            .if_not_exists()
            .col(integer(VolunteerEvent::VolunteerId))
            .col(integer(VolunteerEvent::EventId))
            .col(timestamp(VolunteerEvent::SignupDate).default(Expr::current_timestamp()))
            .primary_key(
                Index::create()
                    .col(VolunteerEvent::VolunteerId)
                    .col(VolunteerEvent::EventId),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_volunteer_event_volunteer")
                    .from(VolunteerEvent::Table, VolunteerEvent::VolunteerId)
                    .to(Volunteer::Table, Volunteer::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_volunteer_event_event")
                    .from(VolunteerEvent::Table, VolunteerEvent::EventId)
                    .to(Event::Table, Event::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        // One request per volunteer and event
        manager
            .create_index(
                Index::create()
                    .name("idx_event_request_volunteer_event")
                    .table(EventRequest::Table)
                    .col(EventRequest::VolunteerId)
                    .col(EventRequest::EventId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_organisation")
                    .table(Event::Table)
                    .col(Event::OrganisationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_volunteer_event_event")
                    .table(VolunteerEvent::Table)
                    .col(VolunteerEvent::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop all tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(VolunteerEvent::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EventRequest::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EventSkill::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await?;

        Ok(())
    }
}
