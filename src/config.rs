use chrono_tz::Tz;
use serenity::all::{ChannelId, GuildId, UserId};

use crate::{
    error::{config::ConfigError, AppError},
    model::presence::{AllowedGames, TrackedPlayer},
};

const DEFAULT_DATABASE_URL: &str = "sqlite://homebot.db?mode=rwc";
const DEFAULT_TIMEZONE: Tz = Tz::Europe__Zurich;
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_LOG_LEVEL: &str = "info";

pub struct Config {
    pub discord_token: String,
    /// Guild whose member roles apply to direct messages.
    pub home_guild: GuildId,
    pub squad_channel: ChannelId,
    pub player_log_channel: ChannelId,
    pub movies_channel: ChannelId,
    /// Mentioned when a new movie is announced.
    pub owner_user: Option<UserId>,

    pub hacker_news_webhook_url: Option<String>,

    pub openai_api_key: Option<String>,
    pub openai_model: String,

    pub bm_token: Option<String>,
    pub bm_players: Vec<TrackedPlayer>,
    pub bm_allowed_games: AllowedGames,

    pub database_url: String,
    pub timezone: Tz,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok().filter(|value| !value.is_empty()))
    }

    /// Builds the configuration from an arbitrary variable source.
    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        Ok(Self {
            discord_token: vars.require("DISCORD_TOKEN")?,
            home_guild: GuildId::new(vars.require_id("DISCORD_SERVER_ID")?),
            squad_channel: ChannelId::new(vars.require_id("DISCORD_SQUAD_CHANNEL_ID")?),
            player_log_channel: ChannelId::new(vars.require_id("DISCORD_PLAYER_LOG_CHANNEL_ID")?),
            movies_channel: ChannelId::new(vars.require_id("DISCORD_MOVIES_CHANNEL_ID")?),
            owner_user: vars.optional_id("DISCORD_OWNER_USER_ID")?.map(UserId::new),
            hacker_news_webhook_url: vars.get("DISCORD_HACKERNEWS_WEBHOOK_URL"),
            openai_api_key: vars.get("OPENAI_API_KEY"),
            openai_model: vars
                .get("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            bm_token: vars.get("BM_TOKEN"),
            bm_players: match vars.get("BM_PLAYERS") {
                Some(value) => parse_players(&value)?,
                None => Vec::new(),
            },
            bm_allowed_games: match vars.get("BM_ALLOWED_GAMES") {
                Some(value) => parse_games(&value),
                None => AllowedGames::default(),
            },
            database_url: vars
                .get("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            timezone: match vars.get("BOT_TIMEZONE") {
                Some(value) => value
                    .parse::<Tz>()
                    .map_err(|e| invalid("BOT_TIMEZONE", e.to_string()))?,
                None => DEFAULT_TIMEZONE,
            },
            log_level: vars
                .get("LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
    }

    fn require(&self, name: &str) -> Result<String, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
    }

    fn require_id(&self, name: &str) -> Result<u64, ConfigError> {
        parse_id(name, &self.require(name)?)
    }

    fn optional_id(&self, name: &str) -> Result<Option<u64>, ConfigError> {
        self.get(name).map(|value| parse_id(name, &value)).transpose()
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Parses a Discord or BattleMetrics id; zero is rejected.
fn parse_id(name: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(invalid(name, "id must not be 0")),
        Ok(id) => Ok(id),
        Err(e) => Err(invalid(name, format!("{:?} is not an id: {}", value, e))),
    }
}

/// Parses `id=name,id,...`; the name is optional.
fn parse_players(value: &str) -> Result<Vec<TrackedPlayer>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, name) = match entry.split_once('=') {
                Some((id, name)) => (id, Some(name.trim().to_string())),
                None => (entry, None),
            };
            Ok(TrackedPlayer {
                id: parse_id("BM_PLAYERS", id)?,
                name: name.filter(|name| !name.is_empty()),
            })
        })
        .collect()
}

/// Parses `id=Display Name,id,...`; ids without a name display as themselves.
fn parse_games(value: &str) -> AllowedGames {
    AllowedGames::new(
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((id, name)) => (id.trim().to_string(), name.trim().to_string()),
                None => (entry.to_string(), entry.to_string()),
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn required() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DISCORD_TOKEN", "token"),
            ("DISCORD_SERVER_ID", "1"),
            ("DISCORD_SQUAD_CHANNEL_ID", "2"),
            ("DISCORD_PLAYER_LOG_CHANNEL_ID", "3"),
            ("DISCORD_MOVIES_CHANNEL_ID", "4"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, AppError> {
        Config::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
    }

    /// Tests that only the Discord variables are required.
    ///
    /// Expected: defaults for everything optional
    #[test]
    fn applies_defaults() {
        let config = load(&required()).unwrap();

        assert_eq!(config.squad_channel, ChannelId::new(2));
        assert_eq!(config.owner_user, None);
        assert_eq!(config.openai_api_key, None);
        assert!(config.bm_players.is_empty());
        assert_eq!(config.bm_allowed_games, AllowedGames::default());
        assert_eq!(config.database_url, "sqlite://homebot.db?mode=rwc");
        assert_eq!(config.timezone, Tz::Europe__Zurich);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reports_missing_variable() {
        let mut vars = required();
        vars.remove("DISCORD_MOVIES_CHANNEL_ID");

        let err = load(&vars).err().unwrap();

        assert_eq!(
            err.to_string(),
            "Missing required environment variable: DISCORD_MOVIES_CHANNEL_ID"
        );
    }

    /// Tests rejection of unparsable values.
    ///
    /// Expected: InvalidEnvVar naming the variable, for a bad id and a bad zone
    #[test]
    fn reports_invalid_values() {
        let mut vars = required();
        vars.insert("DISCORD_SERVER_ID", "home");
        assert!(matches!(
            load(&vars),
            Err(AppError::ConfigErr(ConfigError::InvalidEnvVar { ref name, .. })) if name == "DISCORD_SERVER_ID"
        ));

        let mut vars = required();
        vars.insert("BOT_TIMEZONE", "Mars/Olympus");
        assert!(matches!(
            load(&vars),
            Err(AppError::ConfigErr(ConfigError::InvalidEnvVar { ref name, .. })) if name == "BOT_TIMEZONE"
        ));
    }

    #[test]
    fn parses_players_and_games() {
        let mut vars = required();
        vars.insert("BM_PLAYERS", "131050066=Tarmo, 3554401 ,");
        vars.insert("BM_ALLOWED_GAMES", "squad=Squad,arma3");
        vars.insert("BOT_TIMEZONE", "Europe/Tallinn");

        let config = load(&vars).unwrap();

        assert_eq!(
            config.bm_players,
            vec![
                TrackedPlayer {
                    id: 131050066,
                    name: Some("Tarmo".to_string()),
                },
                TrackedPlayer {
                    id: 3554401,
                    name: None,
                },
            ]
        );
        assert_eq!(config.bm_allowed_games.display_name("squad"), "Squad");
        assert_eq!(config.bm_allowed_games.display_name("arma3"), "arma3");
        assert!(!config.bm_allowed_games.contains("rust"));
        assert_eq!(config.timezone, Tz::Europe__Tallinn);
    }
}
