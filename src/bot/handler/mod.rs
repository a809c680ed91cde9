use serenity::all::{Context, GuildId, Message, Reaction, Ready};
use serenity::async_trait;
use serenity::prelude::EventHandler;
use std::sync::{Arc, OnceLock};

use crate::{discord::ready::ReadyGate, router::EventRouter};

pub mod message;
pub mod reaction;
pub mod ready;

/// Router installed once the Discord HTTP client exists.
///
/// The router's handlers send through the client's HTTP client, which only
/// exists after the client has been built with this handler.
pub type RouterSlot = Arc<OnceLock<EventRouter>>;

/// Discord bot event handler
pub struct Handler {
    router: RouterSlot,
    ready: ReadyGate,
    home_guild: GuildId,
}

impl Handler {
    /// # Arguments
    /// - `router` - Slot holding the router that dispatches converted events
    /// - `ready` - Gate opened once the gateway is ready
    /// - `home_guild` - Guild whose roles apply to direct messages
    pub fn new(router: RouterSlot, ready: ReadyGate, home_guild: GuildId) -> Self {
        Self {
            router,
            ready,
            home_guild,
        }
    }

    fn router(&self) -> Option<&EventRouter> {
        let router = self.router.get();
        if router.is_none() {
            tracing::warn!("Dropping event received before the router was installed");
        }
        router
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(&self.ready, ctx, ready).await;
    }

    /// Called when a message is sent in a channel the bot can see, or as a DM
    async fn message(&self, ctx: Context, message: Message) {
        if let Some(router) = self.router() {
            message::handle_message(router, self.home_guild, ctx, message).await;
        }
    }

    /// Called when a reaction is added to a message
    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        if let Some(router) = self.router() {
            reaction::handle_reaction_add(router, self.home_guild, ctx, reaction).await;
        }
    }
}
