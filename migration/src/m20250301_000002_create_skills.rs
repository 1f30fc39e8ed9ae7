use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

const DEFAULT_SKILLS: [(&str, &str); 4] = [
    ("Endurance", "Ability to sustain effort for long periods"),
    ("Listening", "Good at understanding and following others"),
    ("Talkative", "Engages easily in conversation"),
    ("Public Speaking", "Confident in speaking to groups"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Skill Table
        let table = Table::create()
            .table(Skill::Table)
            .if_not_exists()
            .col(pk_auto(Skill::Id))
            .col(string_uniq(Skill::Name))
            .col(text_null(Skill::Description))
            .to_owned();
        manager.create_table(table).await?;

        // Create VolunteerSkill Table
        let table = Table::create()
            .table(VolunteerSkill::Table)
            .if_not_exists()
            .col(integer(VolunteerSkill::VolunteerId))
            .col(integer(VolunteerSkill::SkillId))
            .primary_key(
                Index::create()
                    .col(VolunteerSkill::VolunteerId)
                    .col(VolunteerSkill::SkillId),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_volunteer_skill_volunteer")
                    .from(VolunteerSkill::Table, VolunteerSkill::VolunteerId)
                    .to(Volunteer::Table, Volunteer::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_volunteer_skill_skill")
                    .from(VolunteerSkill::Table, VolunteerSkill::SkillId)
                    .to(Skill::Table, Skill::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Seed the fixed skill list, leaving existing rows untouched
        let mut seed = Query::insert();
        seed.into_table(Skill::Table)
            .columns([Skill::Name, Skill::Description])
            .on_conflict(OnConflict::column(Skill::Name).do_nothing().to_owned());
        for (name, description) in DEFAULT_SKILLS {
            seed.values_panic([name.into(), description.into()]);
        }
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VolunteerSkill::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Skill::Table).to_owned())
            .await?;

        Ok(())
    }
}
