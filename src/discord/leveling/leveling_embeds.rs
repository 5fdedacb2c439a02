// Embed builders for everything the voice XP system posts.
// Kept free of HTTP calls so the command handlers and the background tasks
// render identical messages.

use crate::core::leveling::{LeaderboardEntry, MemberProgress};
use poise::serenity_prelude as serenity;
use rand::seq::SliceRandom;

/// Display data for a guild member, resolved from the cache by the caller.
#[derive(Debug, Clone)]
pub struct MemberDisplay {
    pub display_name: String,
    pub avatar_url: String,
}

/// Turn leaderboard rows into `(name, value)` embed fields.
///
/// Members that can no longer be resolved (left the guild, not cached) are
/// skipped, but ranks are still numbered by ledger position.
pub fn leaderboard_fields(
    entries: &[LeaderboardEntry],
    resolve: impl Fn(u64) -> Option<String>,
) -> Vec<(String, String)> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let name = resolve(entry.user_id)?;
            Some((
                format!("{}. {}", index + 1, name),
                format!("{} XP (level {})", entry.xp, entry.level),
            ))
        })
        .collect()
}

pub fn progress_description(progress: &MemberProgress) -> String {
    format!(
        "**XP:** {} / {}\n**Level:** {}",
        progress.xp, progress.next_level_xp, progress.level
    )
}

pub fn progress_embed(member: &MemberDisplay, progress: &MemberProgress) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("📊 Your progress")
        .description(progress_description(progress))
        .color(serenity::Colour::BLUE)
        .author(
            serenity::CreateEmbedAuthor::new(&member.display_name)
                .icon_url(member.avatar_url.clone()),
        )
}

pub fn level_up_embed(
    user_id: u64,
    level: u64,
    avatar_url: Option<String>,
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("🎉 Level up!")
        .description(format!(
            "Congratulations <@{}>, you are now **level {}**!",
            user_id, level
        ))
        .color(serenity::Colour::GOLD)
        .footer(serenity::CreateEmbedFooter::new(random_flavor_line()));

    if let Some(url) = avatar_url {
        embed = embed.thumbnail(url);
    }

    embed
}

/// Which leaderboard flavor to render. Both read the same monthly ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardStyle {
    Monthly,
    Global,
    MonthlyRecap,
}

impl LeaderboardStyle {
    fn title(&self) -> &'static str {
        match self {
            LeaderboardStyle::Monthly => "🏆 Monthly Leaderboard",
            LeaderboardStyle::Global => "🌐 Global Leaderboard",
            LeaderboardStyle::MonthlyRecap => "🔄 Monthly Reset",
        }
    }

    fn colour(&self) -> serenity::Colour {
        match self {
            LeaderboardStyle::Monthly => serenity::Colour::PURPLE,
            LeaderboardStyle::Global => serenity::Colour::DARK_GREEN,
            LeaderboardStyle::MonthlyRecap => serenity::Colour::ORANGE,
        }
    }
}

pub fn leaderboard_embed(
    style: LeaderboardStyle,
    fields: Vec<(String, String)>,
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(style.title())
        .color(style.colour());

    if style == LeaderboardStyle::MonthlyRecap {
        embed = embed.description(
            "The monthly leaderboard has been reset! Here are last month's top members:",
        );
    } else if fields.is_empty() {
        embed = embed
            .description("No one has earned XP yet! Hop into a voice channel to get on the board. 🎙️");
    }

    for (name, value) in fields {
        embed = embed.field(name, value, false);
    }

    embed
}

fn random_flavor_line() -> &'static str {
    const FLAVOR_LINES: [&str; 4] = [
        "Keep those voice sessions going!",
        "Every minute in voice counts.",
        "Another level, another flex.",
        "That XP bar never stood a chance.",
    ];

    FLAVOR_LINES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FLAVOR_LINES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: u64, xp: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id,
            xp,
            level: xp / 60,
        }
    }

    #[test]
    fn leaderboard_fields_are_ranked() {
        let entries = vec![entry(3, 200), entry(1, 120), entry(2, 45)];
        let names = |id: u64| Some(format!("user{id}"));

        assert_eq!(
            leaderboard_fields(&entries, names),
            vec![
                ("1. user3".to_string(), "200 XP (level 3)".to_string()),
                ("2. user1".to_string(), "120 XP (level 2)".to_string()),
                ("3. user2".to_string(), "45 XP (level 0)".to_string()),
            ]
        );
    }

    #[test]
    fn unresolved_members_are_left_out() {
        let entries = vec![entry(3, 200), entry(1, 120)];
        let names = |id: u64| (id != 3).then(|| "alice".to_string());

        assert_eq!(
            leaderboard_fields(&entries, names),
            vec![("2. alice".to_string(), "120 XP (level 2)".to_string())]
        );
    }

    #[test]
    fn progress_shows_next_threshold() {
        let progress = MemberProgress {
            user_id: 1,
            guild_id: 2,
            xp: 75,
            level: 1,
            next_level_xp: 120,
        };

        assert_eq!(progress_description(&progress), "**XP:** 75 / 120\n**Level:** 1");
    }

    #[test]
    fn flavor_line_is_never_empty() {
        for _ in 0..10 {
            assert!(!random_flavor_line().is_empty());
        }
    }
}
