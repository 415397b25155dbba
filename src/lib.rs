//! Single-user note-taking and agenda application library
//!
//! This library provides functionality for creating, organizing and
//! reviewing notes with checklists, tags and optional reminders, including
//! the calendar projection of recurring reminders.

mod cli;
mod config;
mod errors;
mod helper;
mod note;
mod projector;
mod store;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use note::*;
pub use projector::*;
pub use store::*;
pub use types::*;
