// The two timers that drive the ledger: voice XP accrual and the monthly reset.
//
// They run as separate tokio tasks so a failure in one never stalls the other,
// and each JoinHandle is tracked so shutdown can abort them.

use crate::discord::leveling::leveling_announcements::{
    send_level_up_embed, send_monthly_reset_embed,
};
use crate::discord::leveling::voice_presence::{current_guild_ids, snapshot_voice_presence};
use crate::discord::Data;
use poise::serenity_prelude as serenity;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

pub const VOICE_TICK_INTERVAL: Duration = Duration::from_secs(60);
pub const MONTHLY_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Handles of every long-running task, so they can be stopped together.
#[derive(Default)]
pub struct BackgroundTasks {
    handles: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, name: &'static str, handle: JoinHandle<()>) {
        self.lock().push((name, handle));
    }

    /// Abort everything tracked so far. Returns how many tasks were still running.
    pub fn abort_all(&self) -> usize {
        let mut running = 0;
        for (name, handle) in self.lock().drain(..) {
            if !handle.is_finished() {
                running += 1;
                tracing::info!(task = name, "Stopping background task");
            }
            handle.abort();
        }
        running
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(&'static str, JoinHandle<()>)>> {
        self.handles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Every minute, give 1 XP to each non-bot member sitting in voice.
pub fn spawn_voice_xp_loop(
    http: Arc<serenity::Http>,
    cache: Arc<serenity::Cache>,
    data: Data,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(VOICE_TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; nobody has earned a full minute yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_voice_tick(&http, &cache, &data).await;
        }
    })
}

async fn run_voice_tick(http: &serenity::Http, cache: &serenity::Cache, data: &Data) {
    let presences = snapshot_voice_presence(cache);

    let level_ups = match data.leveling.apply_voice_tick(&presences).await {
        Ok(level_ups) => level_ups,
        Err(err) => {
            tracing::error!("Voice XP tick failed: {err}");
            return;
        }
    };

    for level_up in &level_ups {
        tracing::info!(
            user_id = level_up.user_id,
            guild_id = level_up.guild_id,
            old_level = level_up.old_level,
            new_level = level_up.new_level,
            total_xp = level_up.total_xp,
            "User leveled up"
        );
    }

    match data.announcements.level_up_targets(level_ups).await {
        Ok(targets) => {
            for (channel_id, level_up) in &targets {
                send_level_up_embed(http, cache, *channel_id, level_up).await;
            }
        }
        Err(err) => tracing::warn!("Failed to read level channels: {err}"),
    }
}

/// Every minute, check whether a new month started and reset the leaderboards.
pub fn spawn_monthly_reset_loop(
    http: Arc<serenity::Http>,
    cache: Arc<serenity::Cache>,
    data: Data,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(MONTHLY_CHECK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            run_monthly_check(&http, &cache, &data).await;
        }
    })
}

async fn run_monthly_check(http: &serenity::Http, cache: &serenity::Cache, data: &Data) {
    let guild_ids = current_guild_ids(cache);

    let resets = match data
        .leveling
        .reset_if_month_boundary(chrono::Utc::now(), &data.monthly_tracker, &guild_ids)
        .await
    {
        Ok(resets) => resets,
        Err(err) => {
            tracing::error!("Monthly reset failed: {err}");
            return;
        }
    };

    match data.announcements.monthly_targets(resets).await {
        Ok(targets) => {
            for (channel_id, reset) in &targets {
                send_monthly_reset_embed(http, cache, *channel_id, reset).await;
            }
        }
        Err(err) => tracing::warn!("Failed to read monthly channels: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn abort_all_stops_running_tasks() {
        let tasks = BackgroundTasks::new();
        let handle = tokio::spawn(async {
            loop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        });
        tasks.track("sleeper", handle);
        tasks.track("done", tokio::spawn(async {}));
        tokio::task::yield_now().await;

        let stopped = tasks.abort_all();
        assert!(stopped >= 1);

        // Nothing left to abort.
        assert_eq!(tasks.abort_all(), 0);
    }
}
