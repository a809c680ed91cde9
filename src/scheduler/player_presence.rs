//! Join and leave announcements for tracked BattleMetrics players.

use serenity::all::ChannelId;
use serenity::async_trait;
use std::sync::Arc;

use crate::{
    command::who::WhoCommand,
    discord::{MessageSink, OutgoingMessage},
    error::AppError,
    model::presence::{AllowedGames, TrackedPlayer},
    scheduler::{schedule::SleepSpec, Task},
    service::{battlemetrics::PresenceSource, presence::PresenceBoard},
};

pub const SLEEP: SleepSpec = SleepSpec::Fixed(30);

pub struct PlayerPresenceTask {
    source: Arc<dyn PresenceSource>,
    players: Vec<TrackedPlayer>,
    games: AllowedGames,
    board: Arc<PresenceBoard>,
    who: Arc<WhoCommand>,
    sink: Arc<dyn MessageSink>,
    log_channel: ChannelId,
}

impl PlayerPresenceTask {
    /// # Arguments
    /// - `source` - Where presence comes from, normally BattleMetrics
    /// - `players` - Players to poll, in announcement order
    /// - `games` - Display names used in join announcements
    /// - `board` - Board shared with the `!who` command
    /// - `who` - Roster command refreshed after every poll
    /// - `sink` - Outbound Discord operations
    /// - `log_channel` - Channel receiving join and leave announcements
    pub fn new(
        source: Arc<dyn PresenceSource>,
        players: Vec<TrackedPlayer>,
        games: AllowedGames,
        board: Arc<PresenceBoard>,
        who: Arc<WhoCommand>,
        sink: Arc<dyn MessageSink>,
        log_channel: ChannelId,
    ) -> Self {
        Self {
            source,
            players,
            games,
            board,
            who,
            sink,
            log_channel,
        }
    }

    async fn poll_player(&self, player: &TrackedPlayer) -> Result<(), AppError> {
        let Some(mut presence) = self.source.player_presence(player.id).await? else {
            return Ok(());
        };

        if let Some(name) = &player.name {
            presence.player_name = name.clone();
        }

        if let Some(change) = self.board.observe(presence).await {
            let announcement = change.announcement(&self.games);
            tracing::info!("{}", announcement);
            self.sink
                .send(self.log_channel, OutgoingMessage::text(announcement))
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl Task for PlayerPresenceTask {
    fn name(&self) -> &str {
        "player_presence"
    }

    async fn work(&self) -> Result<(), AppError> {
        for player in &self.players {
            if let Err(e) = self.poll_player(player).await {
                tracing::error!("Failed to update presence of player {}: {}", player.id, e);
            }
        }

        self.who.refresh(self.sink.as_ref()).await
    }
}
