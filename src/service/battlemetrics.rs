//! BattleMetrics player lookups.
//!
//! Every lookup goes through a 10 second single-flight cache, so the presence
//! task and any other caller asking about the same player within that window
//! share one request.

use reqwest::StatusCode;
use serde::Deserialize;
use serenity::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::SingleFlightCache,
    error::AppError,
    model::presence::{AllowedGames, PlayerPresence, ServerInfo},
};

const BASE_URL: &str = "https://api.battlemetrics.com";
const PLAYER_CACHE_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    data: PlayerData,
    #[serde(default)]
    included: Vec<IncludedServer>,
}

#[derive(Debug, Deserialize)]
struct PlayerData {
    attributes: PlayerAttributes,
}

#[derive(Debug, Deserialize)]
struct PlayerAttributes {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IncludedServer {
    id: String,
    attributes: ServerAttributes,
    #[serde(default)]
    meta: ServerMeta,
    relationships: ServerRelationships,
}

#[derive(Debug, Deserialize)]
struct ServerAttributes {
    name: String,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerMeta {
    #[serde(default)]
    online: bool,
}

#[derive(Debug, Deserialize)]
struct ServerRelationships {
    game: Relationship,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    data: RelationshipData,
}

#[derive(Debug, Deserialize)]
struct RelationshipData {
    id: String,
}

/// Picks the server the player is online on.
///
/// Only the first online server is considered; if its game isn't allowed the
/// player counts as not playing.
fn current_server(included: Vec<IncludedServer>, games: &AllowedGames) -> Option<ServerInfo> {
    let server = included.into_iter().find(|server| server.meta.online)?;
    let game = server.relationships.game.data.id;

    if !games.contains(&game) {
        return None;
    }

    Some(ServerInfo {
        id: server.id,
        name: server.attributes.name,
        country: server.attributes.country.unwrap_or_default().to_lowercase(),
        game,
    })
}

struct BattleMetricsApi {
    http: reqwest::Client,
    token: String,
    games: AllowedGames,
}

impl BattleMetricsApi {
    async fn fetch_player(&self, player_id: u64) -> Result<Option<PlayerPresence>, AppError> {
        tracing::info!("Get current server for player {}", player_id);

        let response = self
            .http
            .get(format!("{}/players/{}", BASE_URL, player_id))
            .query(&[("include", "server"), ("fields[server]", "name,country")])
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!("BattleMetrics player {} not found", player_id);
            return Ok(None);
        }

        let player = response.error_for_status()?.json::<PlayerResponse>().await?;

        Ok(Some(PlayerPresence {
            player_id,
            player_name: player.data.attributes.name,
            server: current_server(player.included, &self.games),
        }))
    }
}

/// Source of player presence, so the presence task can run without the API.
#[async_trait]
pub trait PresenceSource: Send + Sync {
    /// Current presence of a player; `None` if the player doesn't exist.
    async fn player_presence(&self, player_id: u64) -> Result<Option<PlayerPresence>, AppError>;
}

/// Client for the BattleMetrics players API.
pub struct BattleMetricsClient {
    players: SingleFlightCache<u64, Option<PlayerPresence>, AppError>,
}

impl BattleMetricsClient {
    pub fn new(http: reqwest::Client, token: String, games: AllowedGames) -> Self {
        let api = Arc::new(BattleMetricsApi { http, token, games });

        let players = SingleFlightCache::new(
            "battlemetrics.player_server",
            PLAYER_CACHE_TTL,
            move |player_id: u64| {
                let api = Arc::clone(&api);
                async move { api.fetch_player(player_id).await }
            },
        );

        Self { players }
    }
}

#[async_trait]
impl PresenceSource for BattleMetricsClient {
    /// Current presence of a player.
    ///
    /// # Returns
    /// - `Ok(Some(PlayerPresence))` - The player exists; `server` is set when they
    ///   are online on a server of an allowed game
    /// - `Ok(None)` - BattleMetrics doesn't know the player
    /// - `Err(AppError)` - Request failed; the failure stays cached for 10 seconds
    async fn player_presence(&self, player_id: u64) -> Result<Option<PlayerPresence>, AppError> {
        Ok(self.players.call(player_id).await?)
    }
}
