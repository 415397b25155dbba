//! CLI module for the agenda application
//!
//! Handles the command-line interface for interacting with the note store
//! and the calendar projection.
mod app;
mod args;

pub use app::*;
pub use args::*;
