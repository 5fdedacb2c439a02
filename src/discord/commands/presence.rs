// This module handles bot presence on startup.
//
// Discord-layer glue only: we work with Discord SDK types (Context,
// ActivityData, OnlineStatus) and keep it short.

use poise::serenity_prelude as serenity;

/// Called once the bot is ready so members can see what it's tracking.
pub fn on_ready(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::watching("voice channels for XP");
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
