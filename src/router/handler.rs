//! Handler traits for inbound messages and reactions.
//!
//! A handler decides whether it wants an event through `should_handle`, then is
//! run through three phases: `pre_handle`, `handle` and `post_handle`. The
//! default `should_handle` applies the standard gating in a fixed order:
//!
//! 1. bot-authored events are ignored
//! 2. the trigger must match (prefix, predicate or emoji)
//! 3. the channel must be allowed (or the event is an allowed DM)
//! 4. the member must hold one of the required roles, if any are configured

use serenity::all::ChannelId;
use serenity::async_trait;

use crate::{
    discord::{MessageSink, SentMessage},
    error::AppError,
    model::event::{IncomingMessage, IncomingReaction},
    router::options::HandlerOptions,
};

/// Handler for inbound messages.
#[async_trait]
pub trait Command: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn options(&self) -> &HandlerOptions;

    /// Whether the message triggers this command, ignoring channel and role gating.
    async fn matches(&self, message: &IncomingMessage) -> bool;

    async fn should_handle(&self, message: &IncomingMessage) -> bool {
        if message.author.bot {
            return false;
        }

        if !self.matches(message).await {
            return false;
        }

        let options = self.options();
        if !options.permits_channel(message.channel_id, message.is_private()) {
            return false;
        }

        options.permits_roles(&message.member_roles)
    }

    async fn pre_handle(
        &self,
        _sink: &dyn MessageSink,
        _channel_id: ChannelId,
        _message: &IncomingMessage,
    ) -> Result<(), AppError> {
        Ok(())
    }

    /// Handles the message, responding in `channel_id`.
    ///
    /// # Returns
    /// - `Ok(Some(SentMessage))` - The primary response, subject to `response_ttl`
    ///   and passed to `post_handle`
    /// - `Ok(None)` - Nothing was sent
    /// - `Err(AppError)` - Handling failed; logged by the router
    async fn handle(
        &self,
        sink: &dyn MessageSink,
        channel_id: ChannelId,
        message: &IncomingMessage,
    ) -> Result<Option<SentMessage>, AppError>;

    async fn post_handle(
        &self,
        _sink: &dyn MessageSink,
        _channel_id: ChannelId,
        _message: &IncomingMessage,
        _response: Option<&SentMessage>,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

/// Handler for reactions added to messages.
#[async_trait]
pub trait ReactionHandler: Send + Sync {
    fn name(&self) -> &str;

    fn options(&self) -> &HandlerOptions;

    /// Emoji this handler reacts to: custom emoji ids or unicode emoji.
    fn emoji(&self) -> &[&str];

    async fn should_handle(&self, reaction: &IncomingReaction) -> bool {
        if reaction.user.bot {
            return false;
        }

        if !self.emoji().contains(&reaction.emoji.as_str()) {
            return false;
        }

        let options = self.options();
        let message = &reaction.message;
        if !options.permits_channel(message.channel_id, message.is_private()) {
            return false;
        }

        options.permits_roles(&reaction.member_roles)
    }

    async fn pre_handle(
        &self,
        _sink: &dyn MessageSink,
        _channel_id: ChannelId,
        _reaction: &IncomingReaction,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn handle(
        &self,
        sink: &dyn MessageSink,
        channel_id: ChannelId,
        reaction: &IncomingReaction,
    ) -> Result<Option<SentMessage>, AppError>;

    async fn post_handle(
        &self,
        _sink: &dyn MessageSink,
        _channel_id: ChannelId,
        _reaction: &IncomingReaction,
        _response: Option<&SentMessage>,
    ) -> Result<(), AppError> {
        Ok(())
    }
}
