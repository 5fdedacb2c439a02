// Discord commands module.
// Each feature gets its own command file.

pub mod leveling;

pub mod announcements;

// Bot presence management
pub mod presence;
