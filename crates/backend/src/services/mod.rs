//! Business logic kept out of the HTTP handlers.

pub mod users;
