//! # mealcraft_core
//!
//! Core domain logic for MealCraft: credentials, tokens, the user store,
//! the completion client and reply classification.

pub mod auth;
pub mod classify;
pub mod completion;
pub mod migrate;
pub mod models;
pub mod prompts;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
