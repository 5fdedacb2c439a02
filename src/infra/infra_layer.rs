// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "leveling/leveling_store.rs"]
pub mod leveling;

#[path = "announcements/mod.rs"]
pub mod announcements;

#[path = "keep_alive/mod.rs"]
pub mod keep_alive;
