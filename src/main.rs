// This is the entry point of the voice XP bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (in-memory stores, keep-alive server)
// - `discord/` = Discord-specific adapters (commands, announcements, timers)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Start the background timers and the keep-alive endpoint

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::BotConfig;
use crate::core::announcements::AnnouncementService;
use crate::core::leveling::LevelingService;
use crate::core::monthly::MonthlyResetTracker;
use crate::discord::commands::presence;
use crate::discord::leveling::background_tasks::{
    spawn_monthly_reset_loop, spawn_voice_xp_loop, BackgroundTasks,
};
use crate::discord::{Data, Error};
use crate::infra::announcements::InMemoryChannelStore;
use crate::infra::keep_alive::keep_alive_server;
use crate::infra::leveling::InMemoryXpStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.
    // All state lives in memory for the lifetime of the process.

    let leveling_service = Arc::new(LevelingService::new(InMemoryXpStore::new()));
    let announcement_service = Arc::new(AnnouncementService::new(InMemoryChannelStore::new()));
    let monthly_tracker = Arc::new(MonthlyResetTracker::starting_at(chrono::Utc::now()));
    let background_tasks = Arc::new(BackgroundTasks::new());

    let data = Data {
        leveling: Arc::clone(&leveling_service),
        announcements: Arc::clone(&announcement_service),
        monthly_tracker: Arc::clone(&monthly_tracker),
        background_tasks: Arc::clone(&background_tasks),
    };

    // Keep-alive endpoint for hosts that idle processes without inbound traffic.
    if let Some(addr) = config.keep_alive_addr {
        let handle = tokio::spawn(async move {
            if let Err(err) = keep_alive_server::run(addr).await {
                tracing::error!("Keep-alive server stopped: {err}");
            }
        });
        background_tasks.track("keep-alive", handle);
    }

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    // Voice states come from the cache, so the bot needs the voice and member intents.
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let dev_guild_id = config.dev_guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::leveling::level(),
                discord::commands::leveling::leaderboard(),
                discord::commands::leveling::global_leaderboard(),
                discord::commands::announcements::announcements(),
            ],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!(user = %ready.user.name, "Bot is starting up");

                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // A dev guild gets them instantly as well.
                if let Some(guild_id) = dev_guild_id {
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        serenity::GuildId::new(guild_id),
                    )
                    .await?;
                }

                tracing::info!("Commands registered, bot is ready");
                presence::on_ready(ctx);

                // Two independent timers: a panic in one leaves the other running.
                let voice_loop =
                    spawn_voice_xp_loop(ctx.http.clone(), ctx.cache.clone(), data.clone());
                data.background_tasks.track("voice-xp", voice_loop);

                let monthly_loop =
                    spawn_monthly_reset_loop(ctx.http.clone(), ctx.cache.clone(), data.clone());
                data.background_tasks.track("monthly-reset", monthly_loop);

                Ok::<Data, Error>(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    // Ctrl+C stops the timers first, then disconnects the shards so `start` returns.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            let stopped = background_tasks.abort_all();
            tracing::info!(stopped, "Background tasks stopped");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await?;
    Ok(())
}
