// Where each guild wants its announcements to go.
//
// Two independent mappings: one channel for level-up messages, one for the
// monthly leaderboard recap. A missing mapping is not an error - the matching
// announcement is simply not sent.

use crate::core::leveling::{LevelUpEvent, MonthlyResetEvent};
use anyhow::Result;
use async_trait::async_trait;

/// Which announcement a channel mapping is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnouncementKind {
    LevelUp,
    MonthlyReset,
}

impl AnnouncementKind {
    pub fn label(&self) -> &'static str {
        match self {
            AnnouncementKind::LevelUp => "Level-up channel",
            AnnouncementKind::MonthlyReset => "Monthly channel",
        }
    }
}

/// Both mappings for a guild, for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementConfig {
    pub guild_id: u64,
    pub level_channel_id: Option<u64>,
    pub monthly_channel_id: Option<u64>,
}

#[async_trait]
pub trait ChannelConfigStore: Send + Sync {
    async fn get_channel(&self, guild_id: u64, kind: AnnouncementKind) -> Result<Option<u64>>;
    /// Overwrites any previous mapping for the same guild and kind.
    async fn set_channel(&self, guild_id: u64, kind: AnnouncementKind, channel_id: u64)
        -> Result<()>;
}

pub struct AnnouncementService<S: ChannelConfigStore> {
    store: S,
}

impl<S: ChannelConfigStore> AnnouncementService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn set_level_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.set_channel(guild_id, AnnouncementKind::LevelUp, channel_id)
            .await
    }

    pub async fn set_monthly_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.set_channel(guild_id, AnnouncementKind::MonthlyReset, channel_id)
            .await
    }

    pub async fn level_channel(&self, guild_id: u64) -> Result<Option<u64>> {
        self.store
            .get_channel(guild_id, AnnouncementKind::LevelUp)
            .await
    }

    pub async fn monthly_channel(&self, guild_id: u64) -> Result<Option<u64>> {
        self.store
            .get_channel(guild_id, AnnouncementKind::MonthlyReset)
            .await
    }

    pub async fn get_config(&self, guild_id: u64) -> Result<AnnouncementConfig> {
        Ok(AnnouncementConfig {
            guild_id,
            level_channel_id: self.level_channel(guild_id).await?,
            monthly_channel_id: self.monthly_channel(guild_id).await?,
        })
    }

    /// Pair each level-up with its guild's level channel.
    /// Events from guilds without one are dropped.
    pub async fn level_up_targets(
        &self,
        events: Vec<LevelUpEvent>,
    ) -> Result<Vec<(u64, LevelUpEvent)>> {
        self.with_channels(AnnouncementKind::LevelUp, events, |event| event.guild_id)
            .await
    }

    /// Pair each monthly recap with its guild's monthly channel.
    /// The reset itself has already happened; this only decides who hears about it.
    pub async fn monthly_targets(
        &self,
        events: Vec<MonthlyResetEvent>,
    ) -> Result<Vec<(u64, MonthlyResetEvent)>> {
        self.with_channels(AnnouncementKind::MonthlyReset, events, |event| event.guild_id)
            .await
    }

    async fn with_channels<E>(
        &self,
        kind: AnnouncementKind,
        events: Vec<E>,
        guild_of: impl Fn(&E) -> u64,
    ) -> Result<Vec<(u64, E)>> {
        let mut targets = Vec::with_capacity(events.len());
        for event in events {
            let guild_id = guild_of(&event);
            match self.store.get_channel(guild_id, kind).await? {
                Some(channel_id) => targets.push((channel_id, event)),
                None => {
                    tracing::debug!(guild_id, kind = kind.label(), "No channel, not announcing")
                }
            }
        }
        Ok(targets)
    }

    async fn set_channel(
        &self,
        guild_id: u64,
        kind: AnnouncementKind,
        channel_id: u64,
    ) -> Result<()> {
        if guild_id == 0 || channel_id == 0 {
            anyhow::bail!("Invalid guild or channel ID");
        }

        self.store.set_channel(guild_id, kind, channel_id).await?;
        tracing::info!(guild_id, channel_id, kind = kind.label(), "Announcement channel set");
        Ok(())
    }
}
