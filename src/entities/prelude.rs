pub use super::event::Entity as Event;
pub use super::event_request::Entity as EventRequest;
pub use super::event_skill::Entity as EventSkill;
pub use super::organisation::Entity as Organisation;
pub use super::skill::Entity as Skill;
pub use super::user::Entity as User;
pub use super::volunteer::Entity as Volunteer;
pub use super::volunteer_event::Entity as VolunteerEvent;
pub use super::volunteer_skill::Entity as VolunteerSkill;
