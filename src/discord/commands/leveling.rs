// Discord commands for the voice leveling system.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call core service
// 3. Format the response based on the result
//
// This layer is THIN - no business logic, just translation.

use crate::core::announcements::AnnouncementService;
use crate::core::leveling::LevelingService;
use crate::core::monthly::MonthlyResetTracker;
use crate::discord::leveling::background_tasks::BackgroundTasks;
use crate::discord::leveling::leveling_embeds::{
    leaderboard_embed, leaderboard_fields, progress_embed, LeaderboardStyle, MemberDisplay,
};
use crate::discord::leveling::voice_presence::cached_member;
use crate::infra::announcements::InMemoryChannelStore;
use crate::infra::leveling::InMemoryXpStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Show your current voice level and XP.
#[poise::command(slash_command, guild_only)]
pub async fn level(
    ctx: Context<'_>,
    #[description = "User to check (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target_user = user.as_ref().unwrap_or_else(|| ctx.author());
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    if target_user.bot {
        ctx.say("Bots don't earn voice XP! 🤖").await?;
        return Ok(());
    }

    let progress = ctx
        .data()
        .leveling
        .get_member_progress(target_user.id.get(), guild_id)
        .await?;

    tracing::debug!(
        user_id = progress.user_id,
        guild_id = progress.guild_id,
        xp = progress.xp,
        "Showing level progress"
    );

    let member = cached_member(&ctx.serenity_context().cache, progress.guild_id, progress.user_id)
        .unwrap_or_else(|| MemberDisplay {
            display_name: target_user.name.clone(),
            avatar_url: target_user.face(),
        });

    ctx.send(poise::CreateReply::default().embed(progress_embed(&member, &progress)))
        .await?;

    Ok(())
}

/// Show this month's top 3.
#[poise::command(slash_command, guild_only)]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    show_leaderboard(ctx, LeaderboardStyle::Monthly).await
}

/// Show the overall top 3.
#[poise::command(slash_command, guild_only, rename = "globalleaderboard")]
pub async fn global_leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    show_leaderboard(ctx, LeaderboardStyle::Global).await
}

/// Shared logic for both leaderboard commands.
/// XP is wiped every month, so "global" reads the same ledger as "monthly".
async fn show_leaderboard(ctx: Context<'_>, style: LeaderboardStyle) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    let top_members = ctx.data().leveling.get_leaderboard(guild_id).await?;

    let fields = leaderboard_fields(&top_members, |user_id| {
        cached_member(&ctx.serenity_context().cache, guild_id, user_id)
            .map(|member| member.display_name)
    });

    ctx.send(poise::CreateReply::default().embed(leaderboard_embed(style, fields)))
        .await?;

    Ok(())
}

// ============================================================================
// SHARED TYPES
// ============================================================================

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands and background tasks.
/// Every field is an Arc, so cloning hands out another reference to the same services.
#[derive(Clone)]
pub struct Data {
    pub leveling: Arc<LevelingService<InMemoryXpStore>>,
    pub announcements: Arc<AnnouncementService<InMemoryChannelStore>>,
    pub monthly_tracker: Arc<MonthlyResetTracker>,
    pub background_tasks: Arc<BackgroundTasks>,
}
