//! Discord gateway connection.
//!
//! The gateway client only translates Serenity events into the bot's own event
//! types and hands them to the [`EventRouter`](crate::router::EventRouter). Its
//! HTTP client is shared with the periodic tasks through
//! [`HttpSink`](crate::discord::http_sink::HttpSink).
//!
//! # Gateway Intents
//!
//! - `GUILDS` - Guild and channel metadata
//! - `GUILD_MESSAGES` / `DIRECT_MESSAGES` - Commands and chat messages
//! - `MESSAGE_CONTENT` - Message text (privileged intent)
//! - `GUILD_MESSAGE_REACTIONS` / `DIRECT_MESSAGE_REACTIONS` - Reaction handlers
//!
//! `MESSAGE_CONTENT` must be enabled in the Discord Developer Portal.

pub mod handler;
pub mod start;
