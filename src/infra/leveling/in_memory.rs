// This is the infra layer - it implements the traits defined in core.
// This file provides the IN-MEMORY implementation of XpStore.
//
// Voice XP is deliberately not persisted: everything starts empty when the
// process starts and the monthly reset wipes it anyway.

use crate::core::leveling::{LeaderboardEntry, LevelingError, XpStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;

/// A composite key for looking up member XP.
/// We need both user_id AND guild_id since users can be in multiple guilds.
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
struct UserGuildKey {
    user_id: u64,
    guild_id: u64,
}

/// Data we store for each member in each guild.
#[derive(Clone, Copy, Debug, Default)]
struct StoredMemberData {
    xp: u64,
    level: u64,
}

/// In-memory implementation of XpStore.
///
/// **DashMap:**
/// A concurrent HashMap that's safe to use across multiple async tasks.
/// Multi-step updates are serialized per guild by `LevelingService`; commands
/// read the same map concurrently, so each shard is locked independently.
pub struct InMemoryXpStore {
    /// Maps (user_id, guild_id) -> member data
    data: DashMap<UserGuildKey, StoredMemberData>,
}

impl InMemoryXpStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

#[async_trait]
impl XpStore for InMemoryXpStore {
    async fn add_xp(
        &self,
        user_id: u64,
        guild_id: u64,
        amount: u64,
    ) -> Result<u64, LevelingError> {
        let key = UserGuildKey { user_id, guild_id };

        // entry() holds the shard lock, so read-modify-write is atomic.
        let mut entry = self.data.entry(key).or_default();
        entry.xp = entry.xp.saturating_add(amount);
        Ok(entry.xp)
    }

    async fn get_xp(&self, user_id: u64, guild_id: u64) -> Result<u64, LevelingError> {
        let key = UserGuildKey { user_id, guild_id };
        Ok(self.data.get(&key).map(|entry| entry.xp).unwrap_or(0))
    }

    async fn get_level(&self, user_id: u64, guild_id: u64) -> Result<u64, LevelingError> {
        let key = UserGuildKey { user_id, guild_id };
        Ok(self.data.get(&key).map(|entry| entry.level).unwrap_or(0))
    }

    async fn set_level(
        &self,
        user_id: u64,
        guild_id: u64,
        level: u64,
    ) -> Result<(), LevelingError> {
        let key = UserGuildKey { user_id, guild_id };
        if let Some(mut entry) = self.data.get_mut(&key) {
            entry.level = level;
        }
        Ok(())
    }

    async fn get_leaderboard(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, LevelingError> {
        let mut members: Vec<LeaderboardEntry> = self
            .data
            .iter()
            .filter(|entry| entry.key().guild_id == guild_id)
            .map(|entry| LeaderboardEntry {
                user_id: entry.key().user_id,
                xp: entry.value().xp,
                level: entry.value().level,
            })
            .collect();

        // Highest XP first; equal XP falls back to the lowest user id so the
        // order doesn't depend on hash iteration.
        members.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.user_id.cmp(&b.user_id)));
        members.truncate(limit);

        Ok(members)
    }

    async fn clear_guild(&self, guild_id: u64) -> Result<(), LevelingError> {
        self.data.retain(|key, _| key.guild_id != guild_id);
        Ok(())
    }

    async fn guild_ids(&self) -> Result<Vec<u64>, LevelingError> {
        let guilds: HashSet<u64> = self.data.iter().map(|entry| entry.key().guild_id).collect();
        let mut guilds: Vec<u64> = guilds.into_iter().collect();
        guilds.sort_unstable();
        Ok(guilds)
    }
}

impl Default for InMemoryXpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryXpStore::new();

        // Initially, member should have 0 XP and level 0
        assert_eq!(store.get_xp(123, 456).await.unwrap(), 0);
        assert_eq!(store.get_level(123, 456).await.unwrap(), 0);

        assert_eq!(store.add_xp(123, 456, 1).await.unwrap(), 1);
        assert_eq!(store.add_xp(123, 456, 59).await.unwrap(), 60);
        assert_eq!(store.get_xp(123, 456).await.unwrap(), 60);

        store.set_level(123, 456, 1).await.unwrap();
        assert_eq!(store.get_level(123, 456).await.unwrap(), 1);
        assert_eq!(store.get_xp(123, 456).await.unwrap(), 60);
    }

    #[tokio::test]
    async fn test_leaderboard() {
        let store = InMemoryXpStore::new();

        store.add_xp(1, 100, 500).await.unwrap();
        store.add_xp(2, 100, 300).await.unwrap();
        store.add_xp(3, 100, 700).await.unwrap();
        store.add_xp(4, 200, 400).await.unwrap(); // Different guild

        let leaderboard = store.get_leaderboard(100, 10).await.unwrap();

        assert_eq!(leaderboard.len(), 3);
        assert_eq!(leaderboard[0].user_id, 3); // 700 XP
        assert_eq!(leaderboard[1].user_id, 1); // 500 XP
        assert_eq!(leaderboard[2].user_id, 2); // 300 XP
    }

    #[tokio::test]
    async fn equal_xp_ranks_lowest_user_id_first() {
        let store = InMemoryXpStore::new();

        store.add_xp(42, 100, 10).await.unwrap();
        store.add_xp(7, 100, 10).await.unwrap();
        store.add_xp(19, 100, 10).await.unwrap();

        let ids: Vec<u64> = store
            .get_leaderboard(100, 3)
            .await
            .unwrap()
            .iter()
            .map(|e| e.user_id)
            .collect();
        assert_eq!(ids, vec![7, 19, 42]);
    }

    #[tokio::test]
    async fn set_level_never_creates_a_record() {
        let store = InMemoryXpStore::new();

        store.set_level(1, 100, 1).await.unwrap();

        assert_eq!(store.get_level(1, 100).await.unwrap(), 0);
        assert!(store.get_leaderboard(100, 3).await.unwrap().is_empty());
        assert!(store.guild_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_guild_leaves_other_guilds() {
        let store = InMemoryXpStore::new();

        store.add_xp(1, 100, 5).await.unwrap();
        store.set_level(1, 100, 0).await.unwrap();
        store.add_xp(1, 200, 8).await.unwrap();

        store.clear_guild(100).await.unwrap();

        assert_eq!(store.get_xp(1, 100).await.unwrap(), 0);
        assert_eq!(store.get_level(1, 100).await.unwrap(), 0);
        assert_eq!(store.get_xp(1, 200).await.unwrap(), 8);
        assert_eq!(store.guild_ids().await.unwrap(), vec![200]);
    }
}
