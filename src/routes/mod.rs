pub mod account;
pub mod directory;
pub mod events;
