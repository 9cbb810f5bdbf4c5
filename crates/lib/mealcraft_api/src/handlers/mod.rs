//! Request handlers.

pub mod ai;
pub mod auth;
pub mod health;
