use serenity::all::{Client, GatewayIntents, Http};
use std::sync::Arc;

use crate::{bot::handler::Handler, config::Config, error::AppError};

/// Builds the Discord client without connecting it.
///
/// Building first lets the caller take the HTTP client for outbound messages
/// before the gateway connection blocks in [`start_bot`].
///
/// # Arguments
/// - `config` - Application configuration holding the bot token
/// - `handler` - Gateway event handler
///
/// # Returns
/// - `Ok((Client, Arc<Http>))` - Client ready to start, and its shared HTTP client
/// - `Err(AppError)` - Client construction failed (e.g. malformed token)
pub async fn init_bot(config: &Config, handler: Handler) -> Result<(Client, Arc<Http>), AppError> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS;

    let client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await?;
    let http = client.http.clone();

    Ok((client, http))
}

/// Connects to the gateway and processes events until shutdown.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
