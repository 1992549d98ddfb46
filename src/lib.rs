//! Commandeer - A permission-aware command dispatch core for chat bots.
//!
//! Commandeer turns inbound chat messages into command invocations, runs the matching
//! handler and reports the outcome back to the user with whatever the bot is allowed to do
//! in the channel.
//!
//! # Overview
//!
//! - **Prefix and mention invocation**: `!ping` or `@bot ping`, with per-guild prefixes
//!   provided by the host
//! - **Case-insensitive aliases**: a command answers to every first word of its aliases
//! - **Authorization gate**: guild-only and owner-only commands are dropped silently,
//!   missing bot permissions are reported
//! - **Failure isolation**: handler errors and panics become a generic error notice
//! - **Messaging fallback**: reply, react, warn in the channel or by direct message,
//!   depending on the permissions the bot holds
//! - **Help command**: built-in listing of the commands visible to the invoker
//! - **YAML Configuration**: simple configuration file with environment variable support
//!
//! # Architecture
//!
//! - [`permissions`] - Permission names and sets
//! - [`platform`] - The chat platform boundary: message events and outbound actions
//! - [`commands`] - Command descriptors, categories, the registry and the help command
//! - [`dispatch`] - The dispatcher and its pipeline stages
//! - [`config`] - YAML configuration loading with environment variable overrides
//!
//! # Logging
//!
//! Commandeer logs through the [`log`] facade and never installs a logger. Silent drops
//! are logged at `debug`, degraded deliveries at `warn` and handler failures at `error`.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod permissions;
pub mod platform;

pub use commands::{
    CommandCategory, CommandContext, CommandHandler, CommandProperty, CommandResult,
    CommandSpec, HandlerError, handler_fn,
};
pub use config::Config;
pub use dispatch::{Dispatcher, DispatcherBuilder};
pub use permissions::{Permission, PermissionSet};
pub use platform::{Channel, MessageEvent, Platform};
