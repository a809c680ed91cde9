//! `!who`: roster of tracked players grouped by the server they're on.
//!
//! Only the latest roster message per channel is kept. The presence task calls
//! [`WhoCommand::refresh`] after every poll so the live roster is edited in place.

use serenity::all::ChannelId;
use serenity::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    command::lifecycle::PreviousResponses,
    discord::{MessageSink, OutgoingMessage, SentMessage},
    error::AppError,
    model::{event::IncomingMessage, presence::AllowedGames},
    router::{handler::Command, CommandPrefix, HandlerOptions},
    service::presence::{PresenceBoard, ServerRoster},
};

const EMPTY_ROSTER: &str = "No players online";

pub struct WhoCommand {
    prefix: CommandPrefix,
    options: HandlerOptions,
    board: Arc<PresenceBoard>,
    games: AllowedGames,
    responses: PreviousResponses,
    last_rendered: Mutex<Option<String>>,
}

impl WhoCommand {
    /// # Arguments
    /// - `channel_id` - The only channel the command answers in
    /// - `board` - Presence board shared with the presence task
    /// - `games` - Display names for the game line
    pub fn new(channel_id: ChannelId, board: Arc<PresenceBoard>, games: AllowedGames) -> Self {
        Self {
            prefix: CommandPrefix::new("!who"),
            options: HandlerOptions::new().in_channels([channel_id]),
            board,
            games,
            responses: PreviousResponses::new(),
            last_rendered: Mutex::new(None),
        }
    }

    /// Current roster text.
    pub async fn render(&self) -> String {
        let rosters = self.board.rosters().await;
        if rosters.is_empty() {
            return EMPTY_ROSTER.to_string();
        }

        rosters
            .iter()
            .map(|roster| self.render_server(roster))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_server(&self, roster: &ServerRoster) -> String {
        let server = &roster.server;
        // Keeps Discord from turning invite links in server names into embeds.
        let name = server.name.replace("discord.gg/", r"discord.gg\/");

        format!(
            ":flag_{}:   **{}**\n```yaml\nPlayers: {}\nGame:    {}\n```",
            server.country,
            name,
            roster.players.join(", "),
            self.games.display_name(&server.game)
        )
    }

    /// Edits every live roster message if the roster changed since it was last
    /// rendered.
    ///
    /// A failed edit is logged and the remaining messages are still updated.
    pub async fn refresh(&self, sink: &dyn MessageSink) -> Result<(), AppError> {
        let text = self.render().await;

        {
            let mut last_rendered = self.last_rendered.lock().await;
            if last_rendered.as_deref() == Some(text.as_str()) {
                return Ok(());
            }
            *last_rendered = Some(text.clone());
        }

        for message in self.responses.tracked().await {
            if let Err(e) = sink.edit(&message, &text).await {
                tracing::warn!(
                    "Failed to update roster message {} in channel {}: {}",
                    message.id,
                    message.channel_id,
                    e
                );
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Command for WhoCommand {
    fn name(&self) -> &str {
        "who"
    }

    fn options(&self) -> &HandlerOptions {
        &self.options
    }

    async fn matches(&self, message: &IncomingMessage) -> bool {
        self.prefix.matches(&message.content)
    }

    async fn handle(
        &self,
        sink: &dyn MessageSink,
        channel_id: ChannelId,
        _message: &IncomingMessage,
    ) -> Result<Option<SentMessage>, AppError> {
        let text = self.render().await;
        *self.last_rendered.lock().await = Some(text.clone());

        let sent = sink.send(channel_id, OutgoingMessage::text(text)).await?;
        Ok(Some(sent))
    }

    async fn post_handle(
        &self,
        sink: &dyn MessageSink,
        _channel_id: ChannelId,
        _message: &IncomingMessage,
        response: Option<&SentMessage>,
    ) -> Result<(), AppError> {
        match response {
            Some(response) => self.responses.replace(sink, response).await,
            None => Ok(()),
        }
    }
}
