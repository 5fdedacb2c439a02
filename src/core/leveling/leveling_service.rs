// This is the leveling module - it contains ALL the business logic for the voice XP ledger.
// Notice how this module has NO Discord-specific code (no serenity, no poise imports).
// It consumes a plain voice-presence snapshot and hands back level-up events,
// so the Discord layer decides how (and whether) to announce them.

use crate::core::monthly::MonthlyResetTracker;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// XP needed to climb one level.
pub const LEVEL_XP: u64 = 60;

/// XP granted to each eligible member on every voice tick.
pub const XP_PER_INTERVAL: u64 = 1;

/// How many members the leaderboard and the monthly recap show.
pub const LEADERBOARD_SIZE: usize = 3;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// One member as seen in a voice-presence snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceMember {
    pub user_id: u64,
    /// Automated accounts never earn XP.
    pub is_bot: bool,
    /// Is the member currently connected to a voice channel?
    pub in_voice: bool,
}

impl VoiceMember {
    fn is_eligible(&self) -> bool {
        self.in_voice && !self.is_bot
    }
}

/// Voice presence for a single guild at the moment of a tick.
#[derive(Debug, Clone, Default)]
pub struct GuildPresence {
    pub guild_id: u64,
    pub members: Vec<VoiceMember>,
}

/// Represents when a user levels up.
/// This is returned by the service so the Discord layer can announce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpEvent {
    pub guild_id: u64,
    pub user_id: u64,
    pub old_level: u64,
    pub new_level: u64,
    pub total_xp: u64,
}

/// A single leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: u64,
    pub xp: u64,
    pub level: u64,
}

/// What the `/level` command shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProgress {
    pub user_id: u64,
    pub guild_id: u64,
    pub xp: u64,
    pub level: u64,
    /// XP total at which the next level is reached.
    pub next_level_xp: u64,
}

/// Emitted for every guild when the month rolls over.
/// `top_members` is captured right before the guild's records are wiped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyResetEvent {
    pub guild_id: u64,
    pub top_members: Vec<LeaderboardEntry>,
}

// ============================================================================
// ERRORS
// ============================================================================

#[allow(dead_code)]
#[derive(Debug, Error)]
pub enum LevelingError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid user or guild ID")]
    InvalidId,
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================
// The core defines WHAT it needs, but not HOW it's implemented.
// The infra layer provides the in-memory implementation.

/// Trait for holding per-guild, per-member XP and level records.
///
/// The store never computes levels itself. The service derives the level from
/// the XP total and writes it back, so `level == xp / LEVEL_XP` holds after
/// every tick.
#[async_trait]
pub trait XpStore: Send + Sync {
    /// Add XP to a member and return the new total.
    async fn add_xp(&self, user_id: u64, guild_id: u64, amount: u64)
        -> Result<u64, LevelingError>;

    /// Current XP total. Returns 0 if the member has never gained XP in this guild.
    async fn get_xp(&self, user_id: u64, guild_id: u64) -> Result<u64, LevelingError>;

    /// Stored level. Returns 0 for unknown members.
    async fn get_level(&self, user_id: u64, guild_id: u64) -> Result<u64, LevelingError>;

    /// Update the level of an existing record. A missing record stays missing.
    async fn set_level(&self, user_id: u64, guild_id: u64, level: u64)
        -> Result<(), LevelingError>;

    /// Members of a guild ordered by XP (highest first), ties broken by lowest user id.
    async fn get_leaderboard(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, LevelingError>;

    /// Drop every XP and level record of a guild. Other guilds are untouched.
    async fn clear_guild(&self, guild_id: u64) -> Result<(), LevelingError>;

    /// Guilds that currently hold at least one record.
    async fn guild_ids(&self) -> Result<Vec<u64>, LevelingError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// The experience ledger.
///
/// **Generic over S: XpStore**
/// The service doesn't care where the numbers live - it just uses the trait.
///
/// The voice tick and the monthly reset run on separate tasks, so every
/// read-modify-write on a guild's records happens under that guild's lock.
pub struct LevelingService<S: XpStore> {
    store: S,
    /// Guild ID -> lock serializing ticks and resets for that guild
    guild_locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl<S: XpStore> LevelingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            guild_locks: DashMap::new(),
        }
    }

    fn guild_lock(&self, guild_id: u64) -> Arc<Mutex<()>> {
        // Clone the Arc so the DashMap shard isn't held across an await.
        self.guild_locks.entry(guild_id).or_default().clone()
    }

    fn validate_ids(user_id: u64, guild_id: u64) -> Result<(), LevelingError> {
        if user_id == 0 || guild_id == 0 {
            Err(LevelingError::InvalidId)
        } else {
            Ok(())
        }
    }

    fn validate_guild_id(guild_id: u64) -> Result<(), LevelingError> {
        if guild_id == 0 {
            Err(LevelingError::InvalidId)
        } else {
            Ok(())
        }
    }

    /// Level for a given XP total. Plain floor division, no curve.
    pub fn calculate_level(&self, xp: u64) -> u64 {
        xp / LEVEL_XP
    }

    /// XP total at which `current_level + 1` is reached.
    pub fn xp_for_next_level(&self, current_level: u64) -> u64 {
        LEVEL_XP.saturating_mul(current_level.saturating_add(1))
    }

    /// Grant one interval of XP to everyone currently sitting in voice.
    ///
    /// **Returns:** one `LevelUpEvent` per member who crossed a level boundary.
    ///
    /// A guild or member listed twice in the same snapshot is only credited once.
    /// Malformed ids (zero) are skipped rather than failing the whole tick.
    pub async fn apply_voice_tick(
        &self,
        presences: &[GuildPresence],
    ) -> Result<Vec<LevelUpEvent>, LevelingError> {
        let mut events = Vec::new();
        let mut credited: HashSet<(u64, u64)> = HashSet::new();

        for presence in presences {
            let lock = self.guild_lock(presence.guild_id);
            let _guard = lock.lock().await;

            for member in presence.members.iter().filter(|m| m.is_eligible()) {
                if Self::validate_ids(member.user_id, presence.guild_id).is_err() {
                    tracing::warn!(
                        guild_id = presence.guild_id,
                        user_id = member.user_id,
                        "Skipping voice member with an invalid id"
                    );
                    continue;
                }
                if !credited.insert((presence.guild_id, member.user_id)) {
                    continue;
                }

                if let Some(event) = self
                    .credit_member(member.user_id, presence.guild_id)
                    .await?
                {
                    events.push(event);
                }
            }
        }

        tracing::debug!(
            credited = credited.len(),
            level_ups = events.len(),
            "Voice tick applied"
        );

        Ok(events)
    }

    async fn credit_member(
        &self,
        user_id: u64,
        guild_id: u64,
    ) -> Result<Option<LevelUpEvent>, LevelingError> {
        let old_level = self.store.get_level(user_id, guild_id).await?;
        let total_xp = self
            .store
            .add_xp(user_id, guild_id, XP_PER_INTERVAL)
            .await?;
        let new_level = self.calculate_level(total_xp);

        if new_level > old_level {
            self.store.set_level(user_id, guild_id, new_level).await?;
            Ok(Some(LevelUpEvent {
                guild_id,
                user_id,
                old_level,
                new_level,
                total_xp,
            }))
        } else {
            Ok(None)
        }
    }

    /// Members of a guild by descending XP, at most `limit` of them.
    pub async fn get_top_members(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, LevelingError> {
        Self::validate_guild_id(guild_id)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        self.store.get_leaderboard(guild_id, limit).await
    }

    /// The top-3 snapshot shown by the leaderboard commands.
    pub async fn get_leaderboard(
        &self,
        guild_id: u64,
    ) -> Result<Vec<LeaderboardEntry>, LevelingError> {
        self.get_top_members(guild_id, LEADERBOARD_SIZE).await
    }

    /// A member's XP and level. Unknown members simply have nothing yet.
    pub async fn get_member_progress(
        &self,
        user_id: u64,
        guild_id: u64,
    ) -> Result<MemberProgress, LevelingError> {
        Self::validate_ids(user_id, guild_id)?;

        let xp = self.store.get_xp(user_id, guild_id).await?;
        let level = self.store.get_level(user_id, guild_id).await?;

        Ok(MemberProgress {
            user_id,
            guild_id,
            xp,
            level,
            next_level_xp: self.xp_for_next_level(level),
        })
    }

    /// Capture a guild's top members, then wipe its XP and level records.
    pub async fn reset_guild(&self, guild_id: u64) -> Result<MonthlyResetEvent, LevelingError> {
        Self::validate_guild_id(guild_id)?;

        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        let top_members = self.store.get_leaderboard(guild_id, LEADERBOARD_SIZE).await?;
        self.store.clear_guild(guild_id).await?;

        Ok(MonthlyResetEvent {
            guild_id,
            top_members,
        })
    }

    /// Run the monthly reset if `now` belongs to a month the tracker hasn't seen yet.
    ///
    /// Every guild in `guild_ids` gets a reset event (even with an empty leaderboard),
    /// and guilds still holding records are cleared too, so nothing carries over.
    pub async fn reset_if_month_boundary(
        &self,
        now: DateTime<Utc>,
        tracker: &MonthlyResetTracker,
        guild_ids: &[u64],
    ) -> Result<Vec<MonthlyResetEvent>, LevelingError> {
        if !tracker.check(now) {
            return Ok(Vec::new());
        }

        let mut guilds: BTreeSet<u64> =
            guild_ids.iter().copied().filter(|id| *id != 0).collect();
        guilds.extend(self.store.guild_ids().await?);

        let mut events = Vec::with_capacity(guilds.len());
        for guild_id in guilds {
            events.push(self.reset_guild(guild_id).await?);
        }

        let month = tracker.last_processed();
        tracing::info!(
            guilds = events.len(),
            year = month.year,
            month = month.month,
            "Monthly leaderboard reset"
        );

        Ok(events)
    }
}

// ============================================================================
// TESTS
// ============================================================================
