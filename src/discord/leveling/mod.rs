// Discord side of the voice XP system: cache snapshots, embeds, announcements
// and the timers that drive the ledger.

pub mod background_tasks;
pub mod leveling_announcements;
pub mod leveling_embeds;
pub mod voice_presence;
