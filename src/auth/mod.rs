pub mod password;
pub mod router;
pub mod user;
pub mod viewer;
