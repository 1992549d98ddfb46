//! Turns command results into outbound feedback.

use log::{debug, error};

use crate::{
    commands::{CommandInvocation, CommandResult, Generic},
    dispatch::{
        DispatchScope,
        fallback::MessagingFallback,
        responses::{format_error_notice, format_missing_permissions},
    },
    permissions::PermissionSet,
    platform::emoji,
};

/// Reports the outcome of a command to the user.
pub trait ResultProcessor: Send + Sync {
    /// Handles the result returned by a command handler.
    fn process_result(
        &self,
        result: CommandResult,
        invocation: &CommandInvocation,
        scope: &DispatchScope<'_>,
    );

    /// Handles a command rejected because the bot lacks `missing` permissions.
    fn process_missing_permissions(
        &self,
        missing: &PermissionSet,
        invocation: &CommandInvocation,
        scope: &DispatchScope<'_>,
    );
}

/// Delivers every result through the [`MessagingFallback`] chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResultProcessor;

impl ResultProcessor for DefaultResultProcessor {
    fn process_result(
        &self,
        result: CommandResult,
        invocation: &CommandInvocation,
        scope: &DispatchScope<'_>,
    ) {
        let fallback = MessagingFallback::new(scope.platform, scope.settings);

        match result {
            CommandResult::Error(cause) => {
                error!(
                    "command failed on message {} in channel {}: {:?}",
                    invocation.event.message_id,
                    invocation.channel().id,
                    cause
                );
                fallback.deliver(invocation, &format_error_notice(), &PermissionSet::send());
            }
            CommandResult::Message(text) => {
                fallback.deliver(invocation, &text, &PermissionSet::send());
            }
            CommandResult::Generic(Generic::SuccessCheckMark) => fallback.acknowledge(invocation),
            CommandResult::Generic(Generic::SuccessHandled) => {
                debug!("message {} handled by its command", invocation.event.message_id)
            }
        }
    }

    fn process_missing_permissions(
        &self,
        missing: &PermissionSet,
        invocation: &CommandInvocation,
        scope: &DispatchScope<'_>,
    ) {
        MessagingFallback::new(scope.platform, scope.settings).deliver(
            invocation,
            &format_missing_permissions(emoji::X, missing),
            &PermissionSet::send(),
        );
    }
}
