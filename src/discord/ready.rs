//! Gate that opens once the gateway reports ready.

use serenity::all::UserId;
use std::sync::Arc;
use tokio::sync::watch;

/// Identity of the logged-in bot user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotUser {
    pub id: UserId,
    pub name: String,
}

impl BotUser {
    /// Raw mention forms Discord uses for this user (`<@id>` and the legacy `<@!id>`).
    pub fn mentions(&self) -> [String; 2] {
        [format!("<@{}>", self.id), format!("<@!{}>", self.id)]
    }
}

/// Shared, cloneable ready signal.
///
/// Periodic tasks wait on it before their first run; handlers read the bot
/// identity from it.
#[derive(Clone)]
pub struct ReadyGate {
    state: Arc<watch::Sender<Option<BotUser>>>,
}

impl ReadyGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state: Arc::new(state),
        }
    }

    /// Opens the gate. Reconnects reopen it with the same user.
    pub fn open(&self, user: BotUser) {
        self.state.send_replace(Some(user));
    }

    /// Bot user, if the gateway has been ready at least once.
    pub fn current(&self) -> Option<BotUser> {
        self.state.borrow().clone()
    }

    /// Waits until the gate is open and returns the bot user.
    pub async fn wait(&self) -> Option<BotUser> {
        let mut rx = self.state.subscribe();
        let user = rx.wait_for(Option::is_some).await.ok()?;
        user.clone()
    }
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_blocks_until_open() {
        let gate = ReadyGate::new();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        assert!(gate.current().is_none());

        let user = BotUser {
            id: UserId::new(5),
            name: "homebot".to_string(),
        };
        gate.open(user.clone());

        assert_eq!(waiter.await.unwrap(), Some(user));
    }
}
