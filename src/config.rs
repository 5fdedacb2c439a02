// Runtime configuration, read from the environment (and `.env` via dotenv).

use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const DEFAULT_KEEP_ALIVE_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    /// `None` disables the keep-alive HTTP endpoint.
    pub keep_alive_addr: Option<SocketAddr>,
    /// Also register slash commands in this guild so they show up instantly.
    pub dev_guild_id: Option<u64>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .or_else(|| lookup("DISCORD_BOT_TOKEN"))
            .filter(|token| !token.trim().is_empty())
            .context("Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.")?;

        let keep_alive_enabled = match lookup("KEEP_ALIVE_ENABLED") {
            Some(raw) => raw
                .parse::<bool>()
                .with_context(|| format!("KEEP_ALIVE_ENABLED must be true or false, got {raw:?}"))?,
            None => true,
        };

        let keep_alive_addr = if keep_alive_enabled {
            let host = match lookup("KEEP_ALIVE_HOST") {
                Some(raw) => raw
                    .parse::<IpAddr>()
                    .with_context(|| format!("KEEP_ALIVE_HOST is not an IP address: {raw:?}"))?,
                None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            };
            let port = match lookup("KEEP_ALIVE_PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .with_context(|| format!("KEEP_ALIVE_PORT is not a port number: {raw:?}"))?,
                None => DEFAULT_KEEP_ALIVE_PORT,
            };
            Some(SocketAddr::new(host, port))
        } else {
            None
        };

        let dev_guild_id = match lookup("DEV_GUILD_ID") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .with_context(|| format!("DEV_GUILD_ID is not a guild id: {raw:?}"))?,
            ),
            None => None,
        };

        Ok(Self {
            discord_token,
            keep_alive_addr,
            dev_guild_id,
        })
    }
}
