use crate::core::leveling::{LevelUpEvent, MonthlyResetEvent};
use crate::discord::leveling::leveling_embeds::{
    leaderboard_embed, leaderboard_fields, level_up_embed, LeaderboardStyle,
};
use crate::discord::leveling::voice_presence::cached_member;
use poise::serenity_prelude::{self as serenity, builder::CreateMessage};

/// Post a level-up embed to the guild's level channel. A failed send is logged and dropped.
pub async fn send_level_up_embed(
    http: &serenity::Http,
    cache: &serenity::Cache,
    channel_id: u64,
    level_up: &LevelUpEvent,
) {
    let avatar_url = cached_member(cache, level_up.guild_id, level_up.user_id)
        .map(|member| member.avatar_url);
    let embed = level_up_embed(level_up.user_id, level_up.new_level, avatar_url);

    if let Err(err) = serenity::ChannelId::new(channel_id)
        .send_message(http, CreateMessage::new().embed(embed))
        .await
    {
        tracing::warn!(
            guild_id = level_up.guild_id,
            channel_id,
            error = %err,
            "Failed to send level-up embed"
        );
    }
}

/// Post last month's top members to the guild's monthly channel.
pub async fn send_monthly_reset_embed(
    http: &serenity::Http,
    cache: &serenity::Cache,
    channel_id: u64,
    reset: &MonthlyResetEvent,
) {
    let fields = leaderboard_fields(&reset.top_members, |user_id| {
        cached_member(cache, reset.guild_id, user_id).map(|member| member.display_name)
    });
    let embed = leaderboard_embed(LeaderboardStyle::MonthlyRecap, fields);

    if let Err(err) = serenity::ChannelId::new(channel_id)
        .send_message(http, CreateMessage::new().embed(embed))
        .await
    {
        tracing::warn!(
            guild_id = reset.guild_id,
            channel_id,
            error = %err,
            "Failed to send monthly reset embed"
        );
    }
}
