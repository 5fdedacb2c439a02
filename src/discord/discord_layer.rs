// Discord layer - commands, announcements and background tasks.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "leveling/mod.rs"]
pub mod leveling;

// Re-export command types for convenience
pub use commands::leveling::{Context, Data, Error};
