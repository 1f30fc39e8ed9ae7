//! Database-facing operations. Each takes the connection it needs and does its
//! own authorisation checks, so handlers stay thin.

pub mod accounts;
pub mod directory;
pub mod events;
pub mod requests;
pub mod skills;

#[cfg(test)]
pub(crate) mod testing;
