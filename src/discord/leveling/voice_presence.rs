// Reads who is sitting in voice straight from serenity's cache and hands the
// core a plain snapshot. Everything here is synchronous on purpose: cache
// guards must not be held across an await point.

use crate::core::leveling::{GuildPresence, VoiceMember};
use crate::discord::leveling::leveling_embeds::MemberDisplay;
use poise::serenity_prelude as serenity;

/// One `GuildPresence` per guild the bot is in.
pub fn snapshot_voice_presence(cache: &serenity::Cache) -> Vec<GuildPresence> {
    cache
        .guilds()
        .into_iter()
        .filter_map(|guild_id| {
            let guild = cache.guild(guild_id)?;

            let members = guild
                .voice_states
                .values()
                .filter_map(|state| {
                    // Members we can't resolve are skipped: without them we can't tell bots apart.
                    let is_bot = guild
                        .members
                        .get(&state.user_id)
                        .or(state.member.as_ref())
                        .map(|member| member.user.bot)?;

                    Some(VoiceMember {
                        user_id: state.user_id.get(),
                        is_bot,
                        in_voice: state.channel_id.is_some(),
                    })
                })
                .collect();

            Some(GuildPresence {
                guild_id: guild_id.get(),
                members,
            })
        })
        .collect()
}

/// Guild ids the bot currently belongs to.
pub fn current_guild_ids(cache: &serenity::Cache) -> Vec<u64> {
    cache.guilds().iter().map(|guild_id| guild_id.get()).collect()
}

/// Display name and avatar of a cached guild member.
pub fn cached_member(
    cache: &serenity::Cache,
    guild_id: u64,
    user_id: u64,
) -> Option<MemberDisplay> {
    let guild = cache.guild(serenity::GuildId::new(guild_id))?;
    let member = guild.members.get(&serenity::UserId::new(user_id))?;

    Some(MemberDisplay {
        display_name: member.display_name().to_string(),
        avatar_url: member.face(),
    })
}
