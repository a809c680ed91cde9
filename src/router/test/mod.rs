use serenity::all::ChannelId;
use serenity::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    discord::{
        testing::{self, RecordingSink},
        MessageSink, OutgoingMessage, SentMessage,
    },
    error::AppError,
    model::event::{IncomingMessage, IncomingReaction},
    router::{
        handler::{Command, ReactionHandler},
        registry::HandlerRegistry,
        CommandPrefix, EventRouter, HandlerOptions,
    },
};

mod on_message;
mod on_reaction;

/// What a test handler does when dispatched.
#[derive(Clone, Copy)]
enum Behavior {
    Reply,
    Fail,
    Panic,
}

struct TestCommand {
    name: &'static str,
    prefix: CommandPrefix,
    options: HandlerOptions,
    behavior: Behavior,
    handled: AtomicUsize,
}

impl TestCommand {
    fn new(name: &'static str, prefix: &str) -> Self {
        Self {
            name,
            prefix: CommandPrefix::new(prefix),
            options: HandlerOptions::new(),
            behavior: Behavior::Reply,
            handled: AtomicUsize::new(0),
        }
    }

    fn with_options(mut self, options: HandlerOptions) -> Self {
        self.options = options;
        self
    }

    fn behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    fn handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Command for TestCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn options(&self) -> &HandlerOptions {
        &self.options
    }

    async fn matches(&self, message: &IncomingMessage) -> bool {
        self.prefix.matches(&message.content)
    }

    async fn handle(
        &self,
        sink: &dyn MessageSink,
        channel_id: ChannelId,
        _message: &IncomingMessage,
    ) -> Result<Option<SentMessage>, AppError> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Reply => {
                let sent = sink.send(channel_id, OutgoingMessage::text(self.name)).await?;
                Ok(Some(sent))
            }
            Behavior::Fail => Err(AppError::InternalError("handler failed".to_string())),
            Behavior::Panic => panic!("handler bug"),
        }
    }
}

struct TestReaction {
    options: HandlerOptions,
    handled: AtomicUsize,
}

impl TestReaction {
    fn new(options: HandlerOptions) -> Self {
        Self {
            options,
            handled: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReactionHandler for TestReaction {
    fn name(&self) -> &str {
        "thumbs"
    }

    fn options(&self) -> &HandlerOptions {
        &self.options
    }

    fn emoji(&self) -> &[&str] {
        &["👍", "123456"]
    }

    async fn handle(
        &self,
        sink: &dyn MessageSink,
        channel_id: ChannelId,
        reaction: &IncomingReaction,
    ) -> Result<Option<SentMessage>, AppError> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        let sent = sink
            .send(channel_id, OutgoingMessage::text(&reaction.emoji))
            .await?;
        Ok(Some(sent))
    }
}

fn router_with(commands: Vec<Arc<TestCommand>>) -> (EventRouter, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let mut registry = HandlerRegistry::new();
    for command in commands {
        registry.register_command(command);
    }
    (EventRouter::new(registry, sink.clone()), sink)
}
