//! Command execution.
//!
//! Runs a handler to completion and folds every way it can fail into an
//! [`ExecutionOutcome`]. Nothing a handler does, panics included, escapes this boundary.

use std::{any::Any, panic::AssertUnwindSafe};

use futures::FutureExt;
use log::{debug, warn};

use crate::{
    commands::{CommandContext, CommandResult, CommandSpec, HandlerError},
    permissions::PermissionSet,
};

/// Result of running a handler.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The handler returned a result, or failed and was converted to
    /// [`CommandResult::Error`]
    Completed(CommandResult),
    /// A platform action inside the handler was refused for lack of a permission
    MissingPermissions(PermissionSet),
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Executes the handler of `command`.
pub async fn execute(command: &CommandSpec, context: &CommandContext) -> ExecutionOutcome {
    debug!(
        "execute command {} with arguments {:?}",
        command.name(),
        context.invocation.arguments
    );

    let result = AssertUnwindSafe(command.handler().execute(context))
        .catch_unwind()
        .await;

    match result {
        Ok(Ok(result)) => ExecutionOutcome::Completed(result),
        Ok(Err(HandlerError::MissingPermission(permission))) => {
            warn!(
                "command {} refused by the platform, missing {}",
                command.name(),
                permission
            );
            ExecutionOutcome::MissingPermissions(PermissionSet::from(permission))
        }
        Ok(Err(HandlerError::Failed(cause))) => {
            ExecutionOutcome::Completed(CommandResult::Error(cause))
        }
        Err(payload) => ExecutionOutcome::Completed(CommandResult::Error(anyhow::anyhow!(
            "command {} panicked: {}",
            command.name(),
            panic_message(&*payload)
        ))),
    }
}
