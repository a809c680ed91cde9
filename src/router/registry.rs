use std::sync::Arc;

use crate::router::handler::{Command, ReactionHandler};

/// Ordered collection of handlers, built once by the composition root.
///
/// Registration order is priority order: the router picks the first handler
/// whose `should_handle` accepts the event.
#[derive(Default)]
pub struct HandlerRegistry {
    commands: Vec<Arc<dyn Command>>,
    reaction_handlers: Vec<Arc<dyn ReactionHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_command(&mut self, command: Arc<dyn Command>) -> &mut Self {
        tracing::debug!("Registered command {}", command.name());
        self.commands.push(command);
        self
    }

    pub fn register_reaction_handler(&mut self, handler: Arc<dyn ReactionHandler>) -> &mut Self {
        tracing::debug!("Registered reaction handler {}", handler.name());
        self.reaction_handlers.push(handler);
        self
    }

    pub fn commands(&self) -> &[Arc<dyn Command>] {
        &self.commands
    }

    pub fn reaction_handlers(&self) -> &[Arc<dyn ReactionHandler>] {
        &self.reaction_handlers
    }
}
