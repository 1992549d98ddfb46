//! Chat-platform boundary.
//!
//! This module defines everything the dispatch core needs from the chat platform and
//! nothing more:
//! - The inbound [`MessageEvent`] with its author, optional guild/member context, channel
//!   and `edited` flag
//! - The [`Platform`] trait, covering the bot's permission query, fire-and-forget
//!   outbound actions and the application-owner lookup
//! - The [`emoji`] used by outbound reactions and messages
//!
//! # Architecture
//!
//! The network client (gateway connection, rate limiting, object caches) lives outside of
//! this crate. A host wraps its client in a [`Platform`] implementation and feeds
//! [`MessageEvent`]s to the [`Dispatcher`](crate::dispatch::Dispatcher).
//!
//! Outbound actions return immediately: an implementation enqueues the action and reports
//! its own network failures. The core never waits for an acknowledgement.

use async_trait::async_trait;
use mockall::automock;

use crate::permissions::PermissionSet;

pub mod emoji;

/// Kind of channel a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// A text channel inside a guild, subject to the permission model
    GuildText,
    /// A one-to-one conversation between the bot and a user
    Direct,
}

/// A channel messages can be sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    /// Platform identifier of the channel
    pub id: String,
    /// Kind of channel
    pub kind: ChannelKind,
}

impl Channel {
    /// Creates a guild text channel.
    pub fn guild_text(id: &str) -> Self {
        Channel {
            id: id.to_owned(),
            kind: ChannelKind::GuildText,
        }
    }

    /// Creates a direct message channel.
    pub fn direct(id: &str) -> Self {
        Channel {
            id: id.to_owned(),
            kind: ChannelKind::Direct,
        }
    }

    /// Returns `true` when the channel is a guild text channel.
    ///
    /// Only guild text channels support message history and carry per-channel permissions.
    pub fn is_guild_text(&self) -> bool {
        self.kind == ChannelKind::GuildText
    }

    /// Returns the token that references this channel inside a message.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

/// Guild membership of a message author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// User id of the member
    pub user_id: String,
    /// Guild-specific display name, if any
    pub nickname: Option<String>,
}

/// A message received from (or edited on) the platform.
///
/// # Examples
///
/// ```
/// use commandeer::platform::{Channel, MessageEvent};
///
/// let event = MessageEvent {
///     message_id: "m1".to_string(),
///     content: "!ping".to_string(),
///     author_id: "u1".to_string(),
///     guild_id: Some("g1".to_string()),
///     member: None,
///     channel: Channel::guild_text("c1"),
///     edited: false,
/// };
/// assert!(event.channel.is_guild_text());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Platform identifier of the message
    pub message_id: String,
    /// Raw message text, mentions left as platform tokens
    pub content: String,
    /// User id of the author
    pub author_id: String,
    /// Guild the message was posted in, `None` for direct messages
    pub guild_id: Option<String>,
    /// Guild membership of the author, `None` for direct messages
    pub member: Option<Member>,
    /// Channel the message was posted in
    pub channel: Channel,
    /// `true` when the event is an edit of a previously posted message
    pub edited: bool,
}

/// Operations the dispatch core performs against the chat platform.
///
/// All outbound actions are fire-and-forget. Implementations are shared between
/// concurrently processed events and must be cheap to call from any task.
#[automock]
#[async_trait]
pub trait Platform: Send + Sync {
    /// Returns the token that mentions the bot itself in the context of `event`.
    fn self_mention(&self, event: &MessageEvent) -> String;

    /// Returns the permissions the bot holds in the given channel.
    fn self_permissions(&self, channel_id: &str) -> PermissionSet;

    /// Enqueues a text message to a channel.
    fn send_message(&self, channel_id: &str, text: &str);

    /// Enqueues a reaction on a message.
    fn add_reaction(&self, channel_id: &str, message_id: &str, emoji: &str);

    /// Opens, or reuses, the direct message channel with a user.
    fn open_direct_channel(&self, user_id: &str) -> Channel;

    /// Looks up the user id of the bot application's owner.
    async fn application_owner_id(&self) -> anyhow::Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mention() {
        assert_eq!(Channel::guild_text("42").mention(), "<#42>");
    }

    #[test]
    fn test_only_guild_text_is_guild_text() {
        assert!(Channel::guild_text("1").is_guild_text());
        assert!(!Channel::direct("1").is_guild_text());
    }
}
