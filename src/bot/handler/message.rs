//! Conversion of gateway messages into router events.

use serenity::all::{Context, GuildId, Message, RoleId, UserId};

use crate::{
    model::event::{Attachment, Author, IncomingMessage},
    router::EventRouter,
};

/// Handle message creation in a channel or DM
pub async fn handle_message(router: &EventRouter, home_guild: GuildId, ctx: Context, message: Message) {
    let guild_id = message.guild_id;
    let known_roles = message.member.as_ref().map(|member| member.roles.clone());
    let member_roles = if router.requires_roles() {
        member_roles(&ctx, home_guild, message.author.id, known_roles).await
    } else {
        known_roles.unwrap_or_default()
    };

    let incoming = convert_message(message, guild_id, member_roles);
    router.on_message(&incoming).await;
}

/// Builds an [`IncomingMessage`] from a Serenity message.
///
/// `guild_id` is passed separately because messages fetched over HTTP don't
/// carry their guild.
pub fn convert_message(
    message: Message,
    guild_id: Option<GuildId>,
    member_roles: Vec<RoleId>,
) -> IncomingMessage {
    IncomingMessage {
        id: message.id,
        channel_id: message.channel_id,
        guild_id,
        author: Author {
            id: message.author.id,
            name: message.author.name,
            bot: message.author.bot,
        },
        content: message.content,
        attachments: message
            .attachments
            .into_iter()
            .map(|attachment| Attachment {
                url: attachment.url,
                content_type: attachment.content_type,
                size: attachment.size,
            })
            .collect(),
        reply_to: message
            .message_reference
            .and_then(|reference| reference.message_id),
        member_roles,
    }
}

/// Roles of `user_id`, looked up in the home guild when the event didn't
/// include them (DMs, or reactions without member data).
///
/// A user who isn't a member of the home guild has no roles.
pub async fn member_roles(
    ctx: &Context,
    home_guild: GuildId,
    user_id: UserId,
    known: Option<Vec<RoleId>>,
) -> Vec<RoleId> {
    if let Some(roles) = known {
        return roles;
    }

    match ctx.http.get_member(home_guild, user_id).await {
        Ok(member) => member.roles,
        Err(e) => {
            tracing::debug!(
                "No member {} in home guild {}: {}",
                user_id,
                home_guild,
                e
            );
            Vec::new()
        }
    }
}
