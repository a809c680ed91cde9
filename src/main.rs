mod bot;
mod cache;
mod command;
mod config;
mod data;
mod discord;
mod error;
mod logging;
mod model;
mod router;
mod scheduler;
mod service;
mod startup;
mod util;

use std::sync::{Arc, OnceLock};

use crate::{
    bot::handler::Handler,
    command::{
        chat::{ChatCommand, ConversationStore, ForgetConversationReaction},
        who::WhoCommand,
    },
    config::Config,
    discord::{http_sink::HttpSink, ready::ReadyGate, MessageSink},
    error::AppError,
    router::{registry::HandlerRegistry, EventRouter},
    scheduler::{
        chat_cleanup::{self, ChatCleanupTask},
        hacker_news::{self, HackerNewsTask},
        new_movies::{self, NewMoviesTask},
        periodic::PeriodicTask,
        player_presence::{self, PlayerPresenceTask},
        runner::TaskRunner,
    },
    service::{
        battlemetrics::BattleMetricsClient, hacker_news::HackerNewsClient,
        openai::OpenAiClient, presence::PresenceBoard, webhook::Webhook, yts::YtsClient,
    },
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    logging::init(&config.log_level);

    let db = startup::connect_to_database(&config).await?;
    let http_client = startup::setup_reqwest_client()?;
    let ready = ReadyGate::new();

    // Initialize Discord bot and extract HTTP client
    let router_slot = Arc::new(OnceLock::new());
    let handler = Handler::new(router_slot.clone(), ready.clone(), config.home_guild);
    let (bot_client, discord_http) = bot::start::init_bot(&config, handler).await?;
    let sink: Arc<dyn MessageSink> = Arc::new(HttpSink::new(discord_http));

    let runner = TaskRunner::new(ready.clone()).await?;
    let mut registry = HandlerRegistry::new();

    let board = Arc::new(PresenceBoard::new());
    let who = Arc::new(WhoCommand::new(
        config.squad_channel,
        board.clone(),
        config.bm_allowed_games.clone(),
    ));
    registry.register_command(who.clone());

    match &config.openai_api_key {
        Some(api_key) => {
            let openai = Arc::new(OpenAiClient::new(
                http_client.clone(),
                api_key.clone(),
                config.openai_model.clone(),
            ));
            let conversations = Arc::new(ConversationStore::new());

            registry.register_command(Arc::new(ChatCommand::new(
                ready.clone(),
                openai,
                conversations.clone(),
            )));
            registry.register_reaction_handler(Arc::new(ForgetConversationReaction::new(
                conversations.clone(),
            )));
            runner.spawn(PeriodicTask::cron(
                Arc::new(ChatCleanupTask::new(conversations)),
                chat_cleanup::schedule(config.timezone),
            ));
        }
        None => tracing::info!("OPENAI_API_KEY not set, chat is disabled"),
    }

    match &config.bm_token {
        Some(token) => {
            let battlemetrics = Arc::new(BattleMetricsClient::new(
                http_client.clone(),
                token.clone(),
                config.bm_allowed_games.clone(),
            ));
            runner.spawn(PeriodicTask::interval(
                Arc::new(PlayerPresenceTask::new(
                    battlemetrics,
                    config.bm_players.clone(),
                    config.bm_allowed_games.clone(),
                    board,
                    who,
                    sink.clone(),
                    config.player_log_channel,
                )),
                player_presence::SLEEP,
            ));
        }
        None => tracing::info!("BM_TOKEN not set, player presence is disabled"),
    }

    match &config.hacker_news_webhook_url {
        Some(url) => {
            let webhook = Webhook::new(
                http_client.clone(),
                url.clone(),
                hacker_news::WEBHOOK_USERNAME,
                hacker_news::WEBHOOK_AVATAR_URL,
            );
            runner.spawn(PeriodicTask::cron(
                Arc::new(HackerNewsTask::new(
                    db.clone(),
                    HackerNewsClient::new(http_client.clone()),
                    webhook,
                )),
                hacker_news::schedule(config.timezone),
            ));
        }
        None => tracing::info!("DISCORD_HACKERNEWS_WEBHOOK_URL not set, Hacker News is disabled"),
    }

    runner.spawn(PeriodicTask::cron(
        Arc::new(NewMoviesTask::new(
            db.clone(),
            YtsClient::new(http_client.clone()),
            sink.clone(),
            config.movies_channel,
            config.owner_user,
        )),
        new_movies::schedule(config.timezone),
    ));

    if router_slot.set(EventRouter::new(registry, sink)).is_err() {
        return Err(AppError::InternalError(
            "Event router was installed twice".to_string(),
        ));
    }

    bot::start::start_bot(bot_client).await
}
