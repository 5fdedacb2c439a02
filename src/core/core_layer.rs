// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "leveling/leveling_service.rs"]
pub mod leveling;

#[path = "announcements/announcement_service.rs"]
pub mod announcements;

#[path = "monthly/monthly_reset.rs"]
pub mod monthly;
