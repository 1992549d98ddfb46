//! Permission-aware delivery of feedback.
//!
//! The bot may lack the permissions needed for the response it would like to give. The
//! [`MessagingFallback`] walks an ordered chain of outbound actions and uses the best one
//! the bot's current permissions allow.
//!
//! # Acknowledgement
//!
//! ```text
//! guild text channel ─┬─ read-message-history + add-reactions ──► react ✅
//!                     ├─ read-messages + send-messages ─────────► send ✅
//!                     └─ otherwise ─────────────────────────────► warning chain
//! other channels ─────────────────────────────────────────────────► react ✅
//! ```
//!
//! # Plain delivery
//!
//! ```text
//! other channels ─────────────────────────────────────────────────► send text
//! guild text channel ─┬─ required permissions held ─────────────► send text
//!                     └─ otherwise ─────────────────────────────► warning chain
//!
//! warning chain ─┬─ read-messages + send-messages ──────────────► send warning
//!                ├─ add-reactions, message not opted out ───────► react ⚠️
//!                └─ otherwise ──────────────────────────────────► DM warning to author
//! ```
//!
//! The direct message is the terminal tier and has no precondition, so every chain ends
//! with an outbound action.

use log::{debug, warn};

use crate::{
    commands::CommandInvocation,
    dispatch::{
        Settings,
        responses::{format_direct_warning, format_missing_permissions},
    },
    permissions::{Permission, PermissionSet},
    platform::{Platform, emoji},
};

/// How a message reached the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The message itself was sent
    Sent,
    /// A missing-permissions warning was delivered instead
    Degraded,
}

/// Delivers acknowledgements and messages through the best available tier.
pub struct MessagingFallback<'a> {
    platform: &'a dyn Platform,
    settings: &'a Settings,
}

impl<'a> MessagingFallback<'a> {
    pub fn new(platform: &'a dyn Platform, settings: &'a Settings) -> Self {
        MessagingFallback { platform, settings }
    }

    /// Acknowledges a successful command execution.
    pub fn acknowledge(&self, invocation: &CommandInvocation) {
        let channel = invocation.channel();
        let message_id = &invocation.event.message_id;

        if !channel.is_guild_text() {
            self.platform
                .add_reaction(&channel.id, message_id, emoji::WHITE_CHECK_MARK);
            return;
        }

        let held = self.platform.self_permissions(&channel.id);
        let react = PermissionSet::from([Permission::ReadMessageHistory, Permission::AddReactions]);
        if held.contains_all(&react) {
            self.platform
                .add_reaction(&channel.id, message_id, emoji::WHITE_CHECK_MARK);
            return;
        }

        let missing = PermissionSet::send().missing_from(&held);
        if missing.is_empty() {
            debug!("cannot react in channel {}, sending check mark", channel.id);
            self.platform
                .send_message(&channel.id, emoji::WHITE_CHECK_MARK);
            return;
        }

        self.warn(invocation, &held, &missing);
    }

    /// Sends `text` to the invocation channel if the bot holds `required` there.
    ///
    /// Otherwise a warning naming the missing permissions goes through the warning chain.
    pub fn deliver(
        &self,
        invocation: &CommandInvocation,
        text: &str,
        required: &PermissionSet,
    ) -> Delivery {
        let channel = invocation.channel();

        if !channel.is_guild_text() {
            self.platform.send_message(&channel.id, text);
            return Delivery::Sent;
        }

        let held = self.platform.self_permissions(&channel.id);
        let missing = required.missing_from(&held);
        if missing.is_empty() {
            self.platform.send_message(&channel.id, text);
            return Delivery::Sent;
        }

        self.warn(invocation, &held, &missing);
        Delivery::Degraded
    }

    fn warn(&self, invocation: &CommandInvocation, held: &PermissionSet, missing: &PermissionSet) {
        let channel = invocation.channel();
        warn!("missing {} in channel {}", missing, channel.id);

        let warning = format_missing_permissions(emoji::WARNING, missing);

        if held.contains_all(&PermissionSet::send()) {
            self.platform.send_message(&channel.id, &warning);
            return;
        }

        if held.contains(Permission::AddReactions)
            && !self.settings.is_warning_opted_out(&invocation.event.content)
        {
            self.platform
                .add_reaction(&channel.id, &invocation.event.message_id, emoji::WARNING);
            return;
        }

        debug!(
            "no usable tier in channel {}, warning {} directly",
            channel.id,
            invocation.author_id()
        );
        let direct = self.platform.open_direct_channel(invocation.author_id());
        self.platform
            .send_message(&direct.id, &format_direct_warning(&warning, channel));
    }
}
