use sea_orm_migration::prelude::*;

// Define table names
#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    Email,
    PasswordHash,
    PhoneNumber,
    Role,
}

#[derive(DeriveIden)]
pub enum Volunteer {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    DateOfBirth,
    Availability,
}

#[derive(DeriveIden)]
pub enum Organisation {
    Table,
    Id,
    UserId,
    Name,
    Description,
    Address,
    WebsiteUrl,
}

#[derive(DeriveIden)]
pub enum Skill {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
pub enum VolunteerSkill {
    Table,
    VolunteerId,
    SkillId,
}

#[derive(DeriveIden)]
pub enum Event {
    Table,
    Id,
    OrganisationId,
    Title,
    Description,
    EventDate,
    Location,
    MaxVolunteers,
}

#[derive(DeriveIden)]
pub enum EventSkill {
    Table,
    EventId,
    SkillId,
}

#[derive(DeriveIden)]
pub enum EventRequest {
    Table,
    Id,
    VolunteerId,
    EventId,
    Status,
}

#[derive(DeriveIden)]
pub enum VolunteerEvent {
    Table,
    VolunteerId,
    EventId,
    SignupDate,
}
