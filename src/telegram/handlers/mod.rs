//! Telegram bot handler tree configuration
//!
//! The handlers are organized in a testable way, allowing integration tests
//! to use the same handler tree as production code.

pub mod admin;
mod callbacks;
mod commands;
mod listings;
mod schema;
mod settings;
mod types;

pub use schema::schema;
pub use types::{first_name, sender_id, HandlerDeps, HandlerError};
