//! Ready event handler.
//!
//! Fired after every successful gateway handshake, including reconnects. Opens
//! the ready gate so periodic tasks can start and the chat command knows the
//! bot's own mention.

use serenity::all::{Context, Ready};

use crate::discord::ready::{BotUser, ReadyGate};

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `gate` - Ready gate to open
/// - `ctx` - Discord context (unused)
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(gate: &ReadyGate, _ctx: Context, ready: Ready) {
    tracing::info!("{} is connected to Discord", ready.user.name);

    gate.open(BotUser {
        id: ready.user.id,
        name: ready.user.name.clone(),
    });
}
