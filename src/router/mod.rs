//! Routing of inbound Discord events to registered handlers.
//!
//! The router walks the [`HandlerRegistry`] in registration order and dispatches
//! the event to the first handler that accepts it. Dispatch runs the handler's
//! three phases inside a guard so that an error or panic in one handler is logged
//! and never reaches the gateway task.

pub mod handler;
pub mod options;
pub mod registry;

#[cfg(test)]
mod test;

use serenity::all::ChannelId;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    discord::{MessageSink, SentMessage},
    error::AppError,
    model::event::{IncomingMessage, IncomingReaction},
    router::{
        handler::{Command, ReactionHandler},
        registry::HandlerRegistry,
    },
    util::guard::run_guarded,
};

pub use options::{CommandPrefix, HandlerOptions};

/// Dispatches messages and reactions to the first matching handler.
pub struct EventRouter {
    registry: HandlerRegistry,
    sink: Arc<dyn MessageSink>,
}

impl EventRouter {
    pub fn new(registry: HandlerRegistry, sink: Arc<dyn MessageSink>) -> Self {
        Self { registry, sink }
    }

    /// Whether any reaction handler listens for `emoji`.
    ///
    /// Lets the gateway skip fetching the message and user for reactions
    /// nobody handles.
    pub fn handles_emoji(&self, emoji: &str) -> bool {
        self.registry
            .reaction_handlers()
            .iter()
            .any(|handler| handler.emoji().contains(&emoji))
    }

    /// Whether any registered handler gates on member roles.
    ///
    /// When none does, events are routed without looking up the author's roles.
    pub fn requires_roles(&self) -> bool {
        let commands = self
            .registry
            .commands()
            .iter()
            .any(|command| command.options().roles.is_some());
        let reactions = self
            .registry
            .reaction_handlers()
            .iter()
            .any(|handler| handler.options().roles.is_some());
        commands || reactions
    }

    /// Routes a message, responding in the message's own channel.
    ///
    /// # Returns
    /// - `Some(name)` - Name of the handler that was selected
    /// - `None` - No handler accepted the message
    pub async fn on_message(&self, message: &IncomingMessage) -> Option<String> {
        self.route_message(message, None).await
    }

    /// Routes a message, optionally sending the response to another channel.
    pub async fn route_message(
        &self,
        message: &IncomingMessage,
        response_channel: Option<ChannelId>,
    ) -> Option<String> {
        for command in self.registry.commands() {
            if !command.should_handle(message).await {
                continue;
            }

            log_message(message);
            let channel_id = response_channel.unwrap_or(message.channel_id);
            self.dispatch_command(Arc::clone(command), channel_id, message)
                .await;

            return Some(command.name().to_string());
        }

        None
    }

    /// Routes a reaction to the first reaction handler that accepts it.
    ///
    /// Responses go to the channel of the reacted-to message.
    pub async fn on_reaction(&self, reaction: &IncomingReaction) -> Option<String> {
        for handler in self.registry.reaction_handlers() {
            if !handler.should_handle(reaction).await {
                continue;
            }

            log_reaction(reaction);
            let channel_id = reaction.message.channel_id;
            self.dispatch_reaction(Arc::clone(handler), channel_id, reaction)
                .await;

            return Some(handler.name().to_string());
        }

        None
    }

    async fn dispatch_command(
        &self,
        command: Arc<dyn Command>,
        channel_id: ChannelId,
        message: &IncomingMessage,
    ) {
        let sink = self.sink.as_ref();

        let result = run_guarded(command.name(), async {
            command.pre_handle(sink, channel_id, message).await?;
            let response = command.handle(sink, channel_id, message).await?;
            command
                .post_handle(sink, channel_id, message, response.as_ref())
                .await?;
            Ok(response)
        })
        .await;

        self.finish(command.name(), command.options().response_ttl, result);
    }

    async fn dispatch_reaction(
        &self,
        handler: Arc<dyn ReactionHandler>,
        channel_id: ChannelId,
        reaction: &IncomingReaction,
    ) {
        let sink = self.sink.as_ref();

        let result = run_guarded(handler.name(), async {
            handler.pre_handle(sink, channel_id, reaction).await?;
            let response = handler.handle(sink, channel_id, reaction).await?;
            handler
                .post_handle(sink, channel_id, reaction, response.as_ref())
                .await?;
            Ok(response)
        })
        .await;

        self.finish(handler.name(), handler.options().response_ttl, result);
    }

    /// Logs a failed dispatch or schedules deletion of the response.
    fn finish(
        &self,
        name: &str,
        response_ttl: Option<Duration>,
        result: Result<Option<SentMessage>, AppError>,
    ) {
        match result {
            Ok(Some(response)) => {
                if let Some(ttl) = response_ttl {
                    self.delete_after(response, ttl);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Handler {} failed: {}", name, e);
            }
        }
    }

    fn delete_after(&self, response: SentMessage, ttl: Duration) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Err(e) = sink.delete(&response).await {
                tracing::warn!(
                    "Failed to delete expired response {} in channel {}: {}",
                    response.id,
                    response.channel_id,
                    e
                );
            }
        });
    }
}

fn log_message(message: &IncomingMessage) {
    let guild = message
        .guild_id
        .map(|guild_id| format!("Guild: {} | ", guild_id))
        .unwrap_or_default();

    tracing::info!(
        "Handling message | {}Channel: {} | Author: \"{}\" | Message: \"{}\"",
        guild,
        message.channel_id,
        message.author.name,
        message.content
    );
}

fn log_reaction(reaction: &IncomingReaction) {
    let message = &reaction.message;
    let guild = message
        .guild_id
        .map(|guild_id| format!("Guild: {} | ", guild_id))
        .unwrap_or_default();

    tracing::info!(
        "Handling reaction | {}Channel: {} | Author: \"{}\" | Message: \"{}\" | User: {} | Emote: {}",
        guild,
        message.channel_id,
        message.author.name,
        message.content,
        reaction.user.name,
        reaction.emoji
    );
}
