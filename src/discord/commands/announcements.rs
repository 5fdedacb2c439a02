use crate::core::announcements::AnnouncementKind;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Configure where level-ups and the monthly recap are announced.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    subcommands("level_channel", "monthly_channel", "status")
)]
pub async fn announcements(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set the channel for level-up messages.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn level_channel(
    ctx: Context<'_>,
    #[description = "Channel for level-up messages"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    ctx.data()
        .announcements
        .set_level_channel(guild_id, channel.id.get())
        .await?;

    reply_ephemeral(ctx, format!("✅ Level channel set to <#{}>.", channel.id.get())).await
}

/// Set the channel for the monthly leaderboard recap.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn monthly_channel(
    ctx: Context<'_>,
    #[description = "Channel for the monthly recap"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();

    ctx.data()
        .announcements
        .set_monthly_channel(guild_id, channel.id.get())
        .await?;

    reply_ephemeral(ctx, format!("✅ Monthly channel set to <#{}>.", channel.id.get())).await
}

/// Show the current announcement channels.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?.get();
    let config = ctx.data().announcements.get_config(guild_id).await?;

    let mention = |id: Option<u64>| {
        id.map(|id| format!("<#{}>", id))
            .unwrap_or_else(|| "Not set (announcement disabled)".to_string())
    };

    let embed = serenity::CreateEmbed::default()
        .title("Announcement Configuration")
        .color(serenity::Color::BLURPLE)
        .field(
            AnnouncementKind::LevelUp.label(),
            mention(config.level_channel_id),
            false,
        )
        .field(
            AnnouncementKind::MonthlyReset.label(),
            mention(config.monthly_channel_id),
            false,
        )
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Guild ID: {} • Leaderboards reset on the 1st of every month (UTC), announced or not.",
            config.guild_id
        )))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

async fn reply_ephemeral(ctx: Context<'_>, content: String) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
