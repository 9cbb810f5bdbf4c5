//! Business logic behind the handlers.

pub mod ai;
pub mod auth;
