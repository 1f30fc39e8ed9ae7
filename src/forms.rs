//! Typed form bodies, one per endpoint, and their validation into the inputs
//! the services accept.

use serde::Deserialize;

use crate::{
    entities::user::Role,
    error::AppError,
    services::{
        accounts::{AccountUpdate, NewAccount, NewProfile, OrganisationDetails, VolunteerDetails},
        events::NewEvent,
        skills::SkillSelection,
    },
    util::dates::{parse_date_of_birth, parse_event_date},
};

pub const MIN_PASSWORD_LEN: usize = 8;

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, label: &str) -> Result<String, AppError> {
    trimmed(value).ok_or_else(|| AppError::validation(format!("{label} is required.")))
}

fn email(value: Option<String>) -> Result<String, AppError> {
    let email = required(value, "Email")?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::validation("Please enter a valid email address.")),
    }
}

fn date_of_birth(value: Option<String>) -> Result<Option<chrono::NaiveDate>, AppError> {
    trimmed(value)
        .map(|raw| {
            parse_date_of_birth(&raw)
                .ok_or_else(|| AppError::validation("Date of birth must look like YYYY-MM-DD."))
        })
        .transpose()
}

/// Role-specific fields shared by registration and account editing.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub availability: Option<String>,
    pub organisation_name: Option<String>,
    pub organisation_description: Option<String>,
    pub organisation_address: Option<String>,
    pub website_url: Option<String>,
}

impl ProfileFields {
    fn validate(self, role: Role) -> Result<NewProfile, AppError> {
        match role {
            Role::Volunteer => Ok(NewProfile::Volunteer(VolunteerDetails {
                first_name: required(self.first_name, "First name")?,
                last_name: required(self.last_name, "Last name")?,
                date_of_birth: date_of_birth(self.date_of_birth)?,
                availability: trimmed(self.availability),
            })),
            Role::Organisation => Ok(NewProfile::Organisation(OrganisationDetails {
                name: required(self.organisation_name, "Organisation name")?,
                description: trimmed(self.organisation_description),
                address: trimmed(self.organisation_address),
                website_url: trimmed(self.website_url),
            })),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub phone_number: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

impl RegisterForm {
    pub fn validate(self) -> Result<NewAccount, AppError> {
        let email = email(self.email)?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::validation("Password is required."))?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        }
        let role = match trimmed(self.role).as_deref() {
            Some("volunteer") => Role::Volunteer,
            Some("organisation") => Role::Organisation,
            _ => return Err(AppError::validation("Please choose volunteer or organisation.")),
        };

        Ok(NewAccount {
            email,
            password,
            phone_number: trimmed(self.phone_number),
            profile: self.profile.validate(role)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AccountForm {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

impl AccountForm {
    pub fn validate(self, role: Role) -> Result<AccountUpdate, AppError> {
        Ok(AccountUpdate {
            email: email(self.email)?,
            phone_number: trimmed(self.phone_number),
            profile: self.profile.validate(role)?,
        })
    }
}

/// Checkbox list of skill ids; the browser repeats the `skills` key per box.
#[derive(Debug, Default, Deserialize)]
pub struct SkillsForm {
    #[serde(default)]
    pub skills: Vec<i32>,
}

impl SkillsForm {
    pub fn validate(self) -> Result<SkillSelection, AppError> {
        SkillSelection::new(self.skills)
    }
}

#[derive(Debug, Deserialize)]
pub struct EventForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<String>,
    pub location: Option<String>,
    pub max_volunteers: Option<String>,
    #[serde(default)]
    pub skills: Vec<i32>,
}

impl EventForm {
    pub fn validate(self) -> Result<NewEvent, AppError> {
        let title = required(self.title, "Title")?;
        let event_date = required(self.event_date, "Date")?;
        let event_date = parse_event_date(&event_date)
            .ok_or_else(|| AppError::validation("Date must be a valid date and time."))?;
        let max_volunteers = required(self.max_volunteers, "Maximum volunteers")?
            .parse::<i32>()
            .ok()
            .filter(|max| *max >= 1)
            .ok_or_else(|| AppError::validation("Maximum volunteers must be a whole number of at least 1."))?;

        Ok(NewEvent {
            title,
            description: trimmed(self.description),
            event_date,
            location: trimmed(self.location),
            max_volunteers,
            skills: SkillSelection::new(self.skills)?,
        })
    }
}

/// `?skill=` on listings. Blank means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct SkillFilter {
    pub skill: Option<String>,
}

impl SkillFilter {
    pub fn skill_id(&self) -> Option<i32> {
        self.skill.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// `?skill=&matching=` on the organisation listing.
#[derive(Debug, Default, Deserialize)]
pub struct OrganisationQuery {
    pub skill: Option<String>,
    pub matching: Option<String>,
}

impl OrganisationQuery {
    pub fn skill_id(&self) -> Option<i32> {
        self.skill.as_deref().and_then(|s| s.trim().parse().ok())
    }

    pub fn matching(&self) -> bool {
        matches!(self.matching.as_deref(), Some("on" | "true" | "1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn volunteer_registration() -> RegisterForm {
        RegisterForm {
            email: Some("  Ada@Example.org ".into()),
            password: Some("correct horse".into()),
            role: Some("volunteer".into()),
            phone_number: Some("".into()),
            profile: ProfileFields {
                first_name: Some("Ada".into()),
                last_name: Some("Lovelace".into()),
                date_of_birth: Some("1990-12-10".into()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn registration_normalises_fields() {
        let account = volunteer_registration().validate().unwrap();
        assert_eq!(account.email, "ada@example.org");
        assert_eq!(account.phone_number, None);
        let NewProfile::Volunteer(details) = account.profile else {
            panic!("expected a volunteer profile");
        };
        assert_eq!(details.first_name, "Ada");
        assert_eq!(
            details.date_of_birth,
            chrono::NaiveDate::from_ymd_opt(1990, 12, 10)
        );
    }

    #[test]
    fn registration_rejects_missing_role_fields() {
        let mut form = volunteer_registration();
        form.profile.last_name = Some("   ".into());
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Last name is required.");

        let mut form = volunteer_registration();
        form.role = Some("organisation".into());
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Organisation name is required.");
    }

    #[test]
    fn registration_rejects_short_password_and_bad_role() {
        let mut form = volunteer_registration();
        form.password = Some("short".into());
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));

        let mut form = volunteer_registration();
        form.role = Some("admin".into());
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn event_form_requires_positive_capacity() {
        let form = |max: &str| EventForm {
            title: Some("Beach clean".into()),
            description: None,
            event_date: Some("2025-06-01T09:00".into()),
            location: Some("North beach".into()),
            max_volunteers: Some(max.into()),
            skills: vec![1, 2],
        };
        assert_eq!(form("4").validate().unwrap().max_volunteers, 4);
        assert!(matches!(form("0").validate(), Err(AppError::Validation(_))));
        assert!(matches!(form("lots").validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn event_form_caps_skills() {
        let form = EventForm {
            title: Some("Beach clean".into()),
            description: None,
            event_date: Some("2025-06-01T09:00".into()),
            location: None,
            max_volunteers: Some("3".into()),
            skills: vec![1, 2, 3, 4],
        };
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn blank_filters_mean_no_filter() {
        let filter = SkillFilter { skill: Some("".into()) };
        assert_eq!(filter.skill_id(), None);
        let filter = SkillFilter { skill: Some("2".into()) };
        assert_eq!(filter.skill_id(), Some(2));

        let query = OrganisationQuery {
            skill: None,
            matching: Some("on".into()),
        };
        assert!(query.matching());
    }
}
