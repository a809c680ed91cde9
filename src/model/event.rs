//! Transport-neutral inbound events.
//!
//! The bot handler converts Serenity's gateway payloads into these types before
//! routing, so handlers and their tests never need a live `Context`.

use serenity::all::{ChannelId, GuildId, MessageId, RoleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub content_type: Option<String>,
    pub size: u32,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.starts_with("image/"))
    }
}

/// A message received from a guild channel or a DM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    /// `None` for direct messages.
    pub guild_id: Option<GuildId>,
    pub author: Author,
    pub content: String,
    pub attachments: Vec<Attachment>,
    /// Message this one replies to, if any.
    pub reply_to: Option<MessageId>,
    /// Roles the author holds in the guild (the home guild for DMs).
    pub member_roles: Vec<RoleId>,
}

impl IncomingMessage {
    pub fn is_private(&self) -> bool {
        self.guild_id.is_none()
    }
}

/// A reaction added to a message.
///
/// `message` is the reacted-to message, `user` the member who reacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingReaction {
    pub message: IncomingMessage,
    pub user: Author,
    /// Custom emoji id, or the unicode emoji itself.
    pub emoji: String,
    pub member_roles: Vec<RoleId>,
}
