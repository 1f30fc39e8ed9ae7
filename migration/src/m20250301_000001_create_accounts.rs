use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create User Table
        let table = table_auto(User::Table)
            .col(pk_auto(User::Id))
            .col(string_uniq(User::Email))
            .col(string(User::PasswordHash))
            .col(string_null(User::PhoneNumber))
            .col(string_len(User::Role, 32))
            .check(Expr::col(User::Role).is_in(["volunteer", "organisation"]))
            .to_owned();
        manager.create_table(table).await?;

        // Create Volunteer Table
        let table = table_auto(Volunteer::Table)
            .col(pk_auto(Volunteer::Id))
            .col(integer_uniq(Volunteer::UserId))
            .col(string(Volunteer::FirstName))
            .col(string(Volunteer::LastName))
            .col(date_null(Volunteer::DateOfBirth))
            .col(string_null(Volunteer::Availability))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_volunteer_user")
                    .from(Volunteer::Table, Volunteer::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create Organisation Table
        let table = table_auto(Organisation::Table)
            .col(pk_auto(Organisation::Id))
            .col(integer_uniq(Organisation::UserId))
            .col(string(Organisation::Name))
            .col(text_null(Organisation::Description))
            .col(string_null(Organisation::Address))
            .col(string_null(Organisation::WebsiteUrl))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_organisation_user")
                    .from(Organisation::Table, Organisation::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organisation::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Volunteer::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}
