//! Gating options shared by command and reaction handlers.

use std::collections::HashSet;
use std::time::Duration;

use serenity::all::{ChannelId, RoleId};

/// Where a handler may run and who may trigger it.
///
/// Defaults allow every channel including DMs, require no role and keep
/// responses forever. A channel set limits the handler to those channels, and
/// `allow_pm` then lets DMs through as well.
#[derive(Debug, Clone, Default)]
pub struct HandlerOptions {
    /// Allowed channels; `None` allows every channel.
    pub channels: Option<HashSet<ChannelId>>,
    /// Whether direct messages are handled despite a channel set.
    pub allow_pm: bool,
    /// Roles of which the member must hold at least one; `None` allows everyone.
    pub roles: Option<HashSet<RoleId>>,
    /// Delete the handler's response after this long.
    pub response_ttl: Option<Duration>,
}

impl HandlerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_channels(mut self, channels: impl IntoIterator<Item = ChannelId>) -> Self {
        self.channels = Some(channels.into_iter().collect());
        self
    }

    pub fn allow_pm(mut self) -> Self {
        self.allow_pm = true;
        self
    }

    pub fn require_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.roles = Some(roles.into_iter().collect());
        self
    }

    pub fn response_ttl(mut self, ttl: Duration) -> Self {
        self.response_ttl = Some(ttl);
        self
    }

    /// Whether an event in `channel_id` may be handled.
    ///
    /// # Returns
    /// - `true` - No channel set, the channel is in the set, or the event is a DM
    ///   and `allow_pm` is set
    /// - `false` - Otherwise
    pub fn permits_channel(&self, channel_id: ChannelId, is_private: bool) -> bool {
        let in_set = self
            .channels
            .as_ref()
            .is_none_or(|channels| channels.contains(&channel_id));
        in_set || (is_private && self.allow_pm)
    }

    /// Whether a member holding `member_roles` may trigger the handler.
    pub fn permits_roles(&self, member_roles: &[RoleId]) -> bool {
        self.roles
            .as_ref()
            .is_none_or(|roles| member_roles.iter().any(|role| roles.contains(role)))
    }
}

/// Text prefix that triggers a command, e.g. `!who`.
#[derive(Debug, Clone)]
pub struct CommandPrefix {
    prefix: String,
    case_sensitive: bool,
}

impl CommandPrefix {
    /// Case-insensitive prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn matches(&self, content: &str) -> bool {
        if self.case_sensitive {
            return content.starts_with(&self.prefix);
        }
        content
            .get(..self.prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&self.prefix))
    }

    /// Content after the prefix, trimmed. `None` if the prefix doesn't match.
    pub fn strip<'a>(&self, content: &'a str) -> Option<&'a str> {
        if !self.matches(content) {
            return None;
        }
        content.get(self.prefix.len()..).map(str::trim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that a handler without a channel set runs anywhere.
    ///
    /// Expected: guild channels and DMs are both permitted without `allow_pm`
    #[test]
    fn no_channel_set_allows_every_channel() {
        let options = HandlerOptions::new();

        assert!(options.permits_channel(ChannelId::new(5), false));
        assert!(options.permits_channel(ChannelId::new(5), true));
    }

    #[test]
    fn channel_set_rejects_dms_without_allow_pm() {
        let options = HandlerOptions::new().in_channels([ChannelId::new(1)]);

        assert!(options.permits_channel(ChannelId::new(1), false));
        assert!(!options.permits_channel(ChannelId::new(99), true));
    }

    #[test]
    fn channel_set_restricts_guild_channels_but_not_allowed_dms() {
        let options = HandlerOptions::new()
            .in_channels([ChannelId::new(1)])
            .allow_pm();

        assert!(options.permits_channel(ChannelId::new(1), false));
        assert!(!options.permits_channel(ChannelId::new(2), false));
        assert!(options.permits_channel(ChannelId::new(99), true));
    }

    #[test]
    fn any_required_role_is_enough() {
        let options = HandlerOptions::new().require_roles([RoleId::new(7), RoleId::new(8)]);

        assert!(options.permits_roles(&[RoleId::new(1), RoleId::new(8)]));
        assert!(!options.permits_roles(&[RoleId::new(1)]));
        assert!(!options.permits_roles(&[]));
        assert!(HandlerOptions::new().permits_roles(&[]));
    }

    #[test]
    fn prefix_case_sensitivity() {
        let insensitive = CommandPrefix::new("!who");
        let sensitive = CommandPrefix::new("!who").case_sensitive();

        assert!(insensitive.matches("!WHO is online"));
        assert!(!sensitive.matches("!WHO is online"));
        assert!(sensitive.matches("!who"));
        assert!(!insensitive.matches("!wh"));
        assert_eq!(insensitive.strip("!Who  squad "), Some("squad"));
    }

    #[test]
    fn prefix_does_not_panic_on_multibyte_boundary() {
        let prefix = CommandPrefix::new("!ab");

        assert!(!prefix.matches("!aé"));
    }
}
