//! "Delete previous responses" bookkeeping for commands.
//!
//! A command that owns a [`PreviousResponses`] keeps at most one live response
//! per channel: recording a new response first deletes every response it
//! previously recorded in that channel.

use serenity::all::{ChannelId, MessageId};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use crate::{
    discord::{MessageSink, SentMessage},
    error::AppError,
};

/// Responses a command has sent, per channel.
///
/// The whole read, delete and record sequence runs under one lock per instance,
/// so concurrent invocations of the same command never interleave their
/// deletions. Different commands own different instances.
#[derive(Default)]
pub struct PreviousResponses {
    responses: Mutex<HashMap<ChannelId, HashSet<MessageId>>>,
}

impl PreviousResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deletes every tracked response in the new response's channel, then
    /// tracks only the new response.
    ///
    /// Responses already deleted by someone else are tolerated by the sink. Any
    /// other deletion failure is logged and the new response is still recorded.
    pub async fn replace(
        &self,
        sink: &dyn MessageSink,
        response: &SentMessage,
    ) -> Result<(), AppError> {
        let mut responses = self.responses.lock().await;
        let channel_responses = responses.entry(response.channel_id).or_default();

        let previous: Vec<MessageId> = channel_responses.drain().collect();
        if let Err(e) = sink.delete_many(response.channel_id, &previous).await {
            tracing::warn!(
                "Failed to delete previous responses {:?} in channel {}: {}",
                previous,
                response.channel_id,
                e
            );
        }

        channel_responses.insert(response.id);

        Ok(())
    }

    /// Tracks a response without deleting earlier ones.
    pub async fn track(&self, response: &SentMessage) {
        self.responses
            .lock()
            .await
            .entry(response.channel_id)
            .or_default()
            .insert(response.id);
    }

    /// Every tracked response across all channels.
    pub async fn tracked(&self) -> Vec<SentMessage> {
        self.responses
            .lock()
            .await
            .iter()
            .flat_map(|(channel_id, ids)| {
                ids.iter().map(|id| SentMessage {
                    id: *id,
                    channel_id: *channel_id,
                })
            })
            .collect()
    }
}
