use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server a tracked player is currently playing on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: String,
    pub name: String,
    /// Lowercase ISO country code, as used by Discord's `:flag_xx:` emoji.
    pub country: String,
    /// BattleMetrics game id, e.g. `squad`.
    pub game: String,
}

/// Where a tracked player is, according to BattleMetrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPresence {
    pub player_id: u64,
    pub player_name: String,
    /// `None` when the player isn't online on a server of an allowed game.
    pub server: Option<ServerInfo>,
}

/// A BattleMetrics player the bot keeps track of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPlayer {
    pub id: u64,
    /// Name shown in Discord instead of the BattleMetrics name.
    pub name: Option<String>,
}

/// Game ids whose servers count as "playing", mapped to their display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedGames(BTreeMap<String, String>);

impl AllowedGames {
    pub fn new<I, K, V>(games: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            games
                .into_iter()
                .map(|(id, name)| (id.into(), name.into()))
                .collect(),
        )
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.0.contains_key(game_id)
    }

    /// Display name of `game_id`, falling back to the id itself.
    pub fn display_name<'a>(&'a self, game_id: &'a str) -> &'a str {
        self.0.get(game_id).map(String::as_str).unwrap_or(game_id)
    }
}

impl Default for AllowedGames {
    fn default() -> Self {
        Self::new([("squad", "Squad")])
    }
}
