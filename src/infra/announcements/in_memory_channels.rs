use crate::core::announcements::{AnnouncementKind, ChannelConfigStore};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Channel mappings kept for the lifetime of the process.
/// Never cleared automatically, not even by the monthly reset.
pub struct InMemoryChannelStore {
    channels: DashMap<(u64, AnnouncementKind), u64>,
}

impl InMemoryChannelStore {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }
}

impl Default for InMemoryChannelStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelConfigStore for InMemoryChannelStore {
    async fn get_channel(&self, guild_id: u64, kind: AnnouncementKind) -> Result<Option<u64>> {
        Ok(self.channels.get(&(guild_id, kind)).map(|id| *id))
    }

    async fn set_channel(
        &self,
        guild_id: u64,
        kind: AnnouncementKind,
        channel_id: u64,
    ) -> Result<()> {
        self.channels.insert((guild_id, kind), channel_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_overwrites_previous_mapping() {
        let store = InMemoryChannelStore::new();

        store
            .set_channel(1, AnnouncementKind::LevelUp, 10)
            .await
            .unwrap();
        store
            .set_channel(1, AnnouncementKind::LevelUp, 11)
            .await
            .unwrap();

        assert_eq!(
            store.get_channel(1, AnnouncementKind::LevelUp).await.unwrap(),
            Some(11)
        );
        assert_eq!(
            store
                .get_channel(1, AnnouncementKind::MonthlyReset)
                .await
                .unwrap(),
            None
        );
    }
}
