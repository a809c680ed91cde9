//! In-memory board of where tracked players are.

use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::model::presence::{AllowedGames, PlayerPresence, ServerInfo};

/// A change worth announcing in the player log channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceChange {
    Joined {
        player_name: String,
        server: ServerInfo,
    },
    Left {
        player_name: String,
    },
}

impl PresenceChange {
    pub fn announcement(&self, games: &AllowedGames) -> String {
        match self {
            PresenceChange::Joined {
                player_name,
                server,
            } => format!(
                "**{}** joined **{}** ({} :flag_{}:)",
                player_name,
                server.name,
                games.display_name(&server.game),
                server.country
            ),
            PresenceChange::Left { player_name } => format!("**{}** stopped playing", player_name),
        }
    }
}

/// Players grouped under the server they're on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRoster {
    pub server: ServerInfo,
    pub players: Vec<String>,
}

/// Last known presence of every tracked player.
#[derive(Default)]
pub struct PresenceBoard {
    players: RwLock<HashMap<u64, PlayerPresence>>,
}

impl PresenceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fresh observation and reports how the player moved.
    ///
    /// The first observation of a player is only recorded, so a restart
    /// doesn't announce everyone who is already playing.
    ///
    /// # Returns
    /// - `Some(PresenceChange::Joined)` - Player is on a different server than before
    /// - `Some(PresenceChange::Left)` - Player was on a server and now isn't
    /// - `None` - First observation, or nothing changed
    pub async fn observe(&self, presence: PlayerPresence) -> Option<PresenceChange> {
        let mut players = self.players.write().await;
        let previous = players.insert(presence.player_id, presence.clone())?;

        let old_server = previous.server.as_ref().map(|server| server.id.as_str());
        match presence.server {
            Some(server) if old_server != Some(server.id.as_str()) => Some(PresenceChange::Joined {
                player_name: presence.player_name,
                server,
            }),
            None if old_server.is_some() => Some(PresenceChange::Left {
                player_name: presence.player_name,
            }),
            _ => None,
        }
    }

    /// Online players grouped by server, servers ordered by name and players
    /// by name within each server.
    pub async fn rosters(&self) -> Vec<ServerRoster> {
        let players = self.players.read().await;
        let mut servers: BTreeMap<(String, String), ServerRoster> = BTreeMap::new();

        for presence in players.values() {
            let Some(server) = &presence.server else {
                continue;
            };

            servers
                .entry((server.name.clone(), server.id.clone()))
                .or_insert_with(|| ServerRoster {
                    server: server.clone(),
                    players: Vec::new(),
                })
                .players
                .push(presence.player_name.clone());
        }

        servers
            .into_values()
            .map(|mut roster| {
                roster.players.sort_by_key(|name| name.to_lowercase());
                roster
            })
            .collect()
    }
}
