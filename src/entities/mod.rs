pub mod prelude;

pub mod event;
pub mod event_request;
pub mod event_skill;
pub mod organisation;
pub mod skill;
pub mod user;
pub mod volunteer;
pub mod volunteer_event;
pub mod volunteer_skill;
