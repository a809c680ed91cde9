use serenity::all::{Context, GuildId, Reaction, ReactionType};

use crate::{
    bot::handler::message::{convert_message, member_roles},
    model::event::{Author, IncomingReaction},
    router::EventRouter,
};

/// Custom emoji id, or the unicode emoji itself.
fn emoji_key(emoji: &ReactionType) -> Option<String> {
    match emoji {
        ReactionType::Custom { id, .. } => Some(id.to_string()),
        ReactionType::Unicode(emoji) => Some(emoji.clone()),
        _ => None,
    }
}

/// Handle a reaction being added to a message
pub async fn handle_reaction_add(
    router: &EventRouter,
    home_guild: GuildId,
    ctx: Context,
    reaction: Reaction,
) {
    let Some(emoji) = emoji_key(&reaction.emoji) else {
        return;
    };
    if !router.handles_emoji(&emoji) {
        tracing::trace!("No handler for reaction {}", emoji);
        return;
    }

    let message = match reaction.message(&ctx).await {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(
                "Failed to fetch reacted message {} in channel {}: {}",
                reaction.message_id,
                reaction.channel_id,
                e
            );
            return;
        }
    };

    let user = match reaction.user(&ctx).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to fetch reacting user: {}", e);
            return;
        }
    };

    let known_roles = reaction.member.as_ref().map(|member| member.roles.clone());
    let reactor_roles = if router.requires_roles() {
        member_roles(&ctx, home_guild, user.id, known_roles).await
    } else {
        known_roles.unwrap_or_default()
    };

    let incoming = IncomingReaction {
        message: convert_message(message, reaction.guild_id, Vec::new()),
        user: Author {
            id: user.id,
            name: user.name,
            bot: user.bot,
        },
        emoji,
        member_roles: reactor_roles,
    };
    router.on_reaction(&incoming).await;
}
