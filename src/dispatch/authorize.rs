//! Authorization gate run before a command executes.
//!
//! The checks run in a fixed order and stop at the first failure:
//!
//! 1. Guild-only command outside of a guild: silently dropped
//! 2. Owner-only command from anyone but the bot owner: silently dropped
//! 3. Bot lacking required permissions in the channel: reported to the user
//!
//! Silent drops are expected and frequent, and keep owner-only commands hidden. Missing
//! bot permissions are a misconfiguration the server operators can fix, so they are
//! reported.

use log::debug;

use crate::{
    commands::{CommandInvocation, CommandProperty, CommandSpec},
    dispatch::DispatchScope,
    permissions::PermissionSet,
};

/// Decision of an [`AuthorizationGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzDecision {
    /// Execute the command
    Proceed,
    /// Discard the invocation without any outbound action
    SilentlyDrop,
    /// Tell the user which permissions the bot is missing
    MissingPermissions(PermissionSet),
}

/// Checks whether a matched command may run.
pub trait AuthorizationGate: Send + Sync {
    fn authorize(
        &self,
        command: &CommandSpec,
        invocation: &CommandInvocation,
        scope: &DispatchScope<'_>,
    ) -> AuthzDecision;
}

/// Property checks followed by the bot permission check.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAuthorizationGate;

impl AuthorizationGate for DefaultAuthorizationGate {
    fn authorize(
        &self,
        command: &CommandSpec,
        invocation: &CommandInvocation,
        scope: &DispatchScope<'_>,
    ) -> AuthzDecision {
        if command.has_property(CommandProperty::GuildOnly) && invocation.guild_id().is_none() {
            debug!("drop guild only command {} outside of a guild", command.name());
            return AuthzDecision::SilentlyDrop;
        }

        if command.has_property(CommandProperty::BotOwnerOnly)
            && !scope.bot_owner.is_owner(invocation.author_id())
        {
            debug!(
                "drop owner only command {} invoked by {}",
                command.name(),
                invocation.author_id()
            );
            return AuthzDecision::SilentlyDrop;
        }

        // Permissions only exist in guild channels
        let channel = invocation.channel();
        if command.required_permissions().is_empty() || !channel.is_guild_text() {
            return AuthzDecision::Proceed;
        }

        let held = scope.platform.self_permissions(&channel.id);
        let missing = command.required_permissions().missing_from(&held);
        match missing.is_empty() {
            true => AuthzDecision::Proceed,
            false => AuthzDecision::MissingPermissions(missing),
        }
    }
}
