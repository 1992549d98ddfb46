//! Command descriptors, results and the invocation context.
//!
//! This module holds the static side of command handling: what a command is, how it is
//! grouped and what executing it may produce.
//!
//! # Overview
//!
//! - [`CommandSpec`] - immutable descriptor: aliases, properties, required permissions, handler
//! - [`CommandCategory`] - named, ordered group of commands
//! - [`CommandRegistry`] - the set of registered categories, used to resolve alias tokens
//! - [`CommandInvocation`] - one matched message: arguments, prefix and message context
//! - [`CommandContext`] - what a handler receives: the invocation plus platform access
//! - [`CommandResult`] - what a handler returns on success
//! - [`HandlerError`] - what a handler returns on failure
//!
//! # Flow
//!
//! ```text
//! MessageEvent ──► CommandRegistry::find ──► CommandSpec + CommandInvocation
//!                                                    │
//!                                                    ▼
//!                                  CommandHandler::execute(&CommandContext)
//!                                                    │
//!                                                    ▼
//!                                  Result<CommandResult, HandlerError>
//! ```
//!
//! # Examples
//!
//! ```
//! use commandeer::commands::{
//!     CommandCategory, CommandProperty, CommandResult, CommandSpec, handler_fn,
//! };
//! use commandeer::permissions::Permission;
//!
//! let ping = CommandSpec::new(
//!     "ping",
//!     "Replies with pong",
//!     handler_fn(|_| Ok(CommandResult::message("pong"))),
//! )
//! .with_aliases(["ping", "p"])
//! .with_property(CommandProperty::GuildOnly)
//! .requires([Permission::SendMessages]);
//!
//! let category = CommandCategory::new("Utility", "Small helpers").with_command(ping);
//! assert!(category.find("P").is_some());
//! ```

use std::{collections::HashSet, fmt, sync::Arc};

use async_trait::async_trait;

use crate::{
    permissions::{Permission, PermissionSet},
    platform::{Channel, Member, MessageEvent, Platform},
};

pub mod help;
mod registry;

pub use crate::commands::registry::{CommandRegistry, Snapshot, find_command};

/// Authorization properties of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandProperty {
    /// The command is ignored outside of guilds
    GuildOnly,
    /// The command is ignored unless invoked by the bot owner
    BotOwnerOnly,
}

/// Outcomes that need no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generic {
    /// Acknowledge the invocation with a check mark
    SuccessCheckMark,
    /// The handler already produced every user-visible effect
    SuccessHandled,
}

/// Outcome of a command execution.
///
/// Exactly one variant is produced per execution. The
/// [`ResultProcessor`](crate::dispatch::ResultProcessor) matches it exhaustively.
#[derive(Debug)]
pub enum CommandResult {
    /// The command failed; the cause is logged and the user gets a generic notice
    Error(anyhow::Error),
    /// Text to send back verbatim
    Message(String),
    /// A payload-less outcome
    Generic(Generic),
}

impl CommandResult {
    /// Shorthand for [`CommandResult::Message`].
    pub fn message(text: impl Into<String>) -> Self {
        CommandResult::Message(text.into())
    }

    /// Shorthand for [`Generic::SuccessCheckMark`].
    pub fn check_mark() -> Self {
        CommandResult::Generic(Generic::SuccessCheckMark)
    }

    /// Shorthand for [`Generic::SuccessHandled`].
    pub fn handled() -> Self {
        CommandResult::Generic(Generic::SuccessHandled)
    }
}

/// Failure signalled by a command handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A platform action was refused because the bot lacks a permission.
    ///
    /// Reported to the user like a failed permission pre-check.
    #[error("missing permission {0}")]
    MissingPermission(Permission),
    /// Any other failure
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Business logic of a command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, context: &CommandContext) -> Result<CommandResult, HandlerError>;
}

/// A [`CommandHandler`] backed by a synchronous closure. See [`handler_fn`].
pub struct FnHandler<F>(F);

/// Wraps a closure into a [`CommandHandler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&CommandContext) -> Result<CommandResult, HandlerError> + Send + Sync,
{
    FnHandler(f)
}

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&CommandContext) -> Result<CommandResult, HandlerError> + Send + Sync,
{
    async fn execute(&self, context: &CommandContext) -> Result<CommandResult, HandlerError> {
        (self.0)(context)
    }
}

/// Immutable descriptor of a command.
///
/// The first alias is the display form used by the help listing. It may carry argument
/// hints after its first word (`"ban <user> [reason]"`); only the first word is matched
/// against invocations.
pub struct CommandSpec {
    name: String,
    description: String,
    aliases: Vec<String>,
    properties: HashSet<CommandProperty>,
    required_permissions: PermissionSet,
    handler: Arc<dyn CommandHandler>,
}

impl CommandSpec {
    /// Creates a command whose only alias is its name.
    pub fn new(name: &str, description: &str, handler: impl CommandHandler + 'static) -> Self {
        CommandSpec {
            name: name.to_owned(),
            description: description.to_owned(),
            aliases: vec![name.to_owned()],
            properties: HashSet::new(),
            required_permissions: PermissionSet::new(),
            handler: Arc::new(handler),
        }
    }

    /// Replaces the aliases. An empty list keeps the current ones.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases = aliases.into_iter().map(Into::into).collect::<Vec<String>>();
        if !aliases.is_empty() {
            self.aliases = aliases;
        }
        self
    }

    pub fn with_property(mut self, property: CommandProperty) -> Self {
        self.properties.insert(property);
        self
    }

    /// Adds permissions the bot must hold in the channel before the command runs.
    pub fn requires(mut self, permissions: impl Into<PermissionSet>) -> Self {
        for permission in permissions.into() {
            self.required_permissions.insert(permission);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The first alias, shown by the help listing.
    pub fn display_alias(&self) -> &str {
        self.aliases.first().map(String::as_str).unwrap_or(&self.name)
    }

    pub fn has_property(&self, property: CommandProperty) -> bool {
        self.properties.contains(&property)
    }

    pub fn required_permissions(&self) -> &PermissionSet {
        &self.required_permissions
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    /// Returns `true` if `token` invokes this command.
    ///
    /// An alias matches when its first space-delimited word equals the token, ignoring case.
    pub fn matches(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.aliases.iter().any(|alias| {
            let word = alias.split(' ').next().unwrap_or(alias);
            word.to_lowercase() == token
        })
    }

    /// Returns `true` if the command may be listed to a user in the given situation.
    pub fn is_visible(&self, in_guild: bool, is_bot_owner: bool) -> bool {
        if self.has_property(CommandProperty::GuildOnly) && !in_guild {
            return false;
        }
        !(self.has_property(CommandProperty::BotOwnerOnly) && !is_bot_owner)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("properties", &self.properties)
            .field("required_permissions", &self.required_permissions)
            .finish_non_exhaustive()
    }
}

/// Named group of commands.
///
/// The command order is the order of insertion; it breaks ties in the help listing and
/// in alias resolution.
#[derive(Debug)]
pub struct CommandCategory {
    name: String,
    description: String,
    commands: Vec<Arc<CommandSpec>>,
}

impl CommandCategory {
    pub fn new(name: &str, description: &str) -> Self {
        CommandCategory {
            name: name.to_owned(),
            description: description.to_owned(),
            commands: Vec::new(),
        }
    }

    /// Creates a category made of a single command, named and described after it.
    pub fn single(command: CommandSpec) -> Self {
        CommandCategory::new(&command.name, &command.description).with_command(command)
    }

    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.commands.push(Arc::new(command));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn commands(&self) -> &[Arc<CommandSpec>] {
        &self.commands
    }

    /// Returns the first command of the category matching `token`.
    pub fn find(&self, token: &str) -> Option<&Arc<CommandSpec>> {
        self.commands.iter().find(|command| command.matches(token))
    }
}

/// A message that matched a registered command.
///
/// Produced by the [`EventPreprocessor`](crate::dispatch::EventPreprocessor) and
/// discarded once the pipeline completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// The triggering message
    pub event: MessageEvent,
    /// Space-delimited words following the command token
    pub arguments: Vec<String>,
    /// The prefix that was used, the bot mention followed by a space for mention invocations
    pub prefix: String,
}

impl CommandInvocation {
    pub fn guild_id(&self) -> Option<&str> {
        self.event.guild_id.as_deref()
    }

    pub fn channel(&self) -> &Channel {
        &self.event.channel
    }

    pub fn author_id(&self) -> &str {
        &self.event.author_id
    }

    pub fn member(&self) -> Option<&Member> {
        self.event.member.as_ref()
    }

    pub fn edited(&self) -> bool {
        self.event.edited
    }
}

/// Runtime context handed to a [`CommandHandler`].
pub struct CommandContext {
    /// The invocation being executed
    pub invocation: CommandInvocation,
    /// Platform client, for handlers that act on their own
    pub platform: Arc<dyn Platform>,
    /// Snapshot of the registered categories at dispatch time
    pub categories: Arc<Vec<Arc<CommandCategory>>>,
    /// Owner of the bot application, if known
    pub bot_owner_id: Option<String>,
}

impl CommandContext {
    /// Returns `true` if the invoking user is the bot owner.
    pub fn is_bot_owner(&self) -> bool {
        self.bot_owner_id.as_deref() == Some(self.invocation.author_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> FnHandler<impl Fn(&CommandContext) -> Result<CommandResult, HandlerError>> {
        handler_fn(|_| Ok(CommandResult::handled()))
    }

    #[test]
    fn test_new_command_uses_name_as_alias() {
        let spec = CommandSpec::new("ping", "Replies", noop());
        assert_eq!(spec.aliases(), ["ping"]);
        assert_eq!(spec.display_alias(), "ping");
    }

    #[test]
    fn test_matches_ignores_case() {
        let spec = CommandSpec::new("ping", "Replies", noop());
        assert!(spec.matches("ping"));
        assert!(spec.matches("PING"));
        assert!(!spec.matches("pinger"));
        assert!(!spec.matches("pin"));
    }

    #[test]
    fn test_matches_only_first_word_of_alias() {
        let spec = CommandSpec::new("ban", "Bans", noop()).with_aliases(["ban <user> [reason]"]);
        assert!(spec.matches("Ban"));
        assert!(!spec.matches("<user>"));
        assert_eq!(spec.display_alias(), "ban <user> [reason]");
    }

    #[test]
    fn test_empty_aliases_keep_defaults() {
        let spec = CommandSpec::new("ping", "Replies", noop()).with_aliases(Vec::<String>::new());
        assert_eq!(spec.aliases(), ["ping"]);
    }

    #[test]
    fn test_requires_accumulates() {
        let spec = CommandSpec::new("embed", "Embeds", noop())
            .requires(Permission::SendMessages)
            .requires([Permission::EmbedLinks]);
        assert_eq!(
            spec.required_permissions(),
            &PermissionSet::from([Permission::SendMessages, Permission::EmbedLinks])
        );
    }

    #[test]
    fn test_visibility() {
        let guild_only =
            CommandSpec::new("a", "", noop()).with_property(CommandProperty::GuildOnly);
        let owner_only =
            CommandSpec::new("b", "", noop()).with_property(CommandProperty::BotOwnerOnly);

        assert!(guild_only.is_visible(true, false));
        assert!(!guild_only.is_visible(false, true));
        assert!(owner_only.is_visible(false, true));
        assert!(!owner_only.is_visible(true, false));
    }

    #[test]
    fn test_single_category_takes_command_identity() {
        let category = CommandCategory::single(CommandSpec::new("help", "Lists", noop()));
        assert_eq!(category.name(), "help");
        assert_eq!(category.description(), "Lists");
        assert_eq!(category.commands().len(), 1);
    }

    #[test]
    fn test_category_find_returns_first_match() {
        let category = CommandCategory::new("Fun", "")
            .with_command(CommandSpec::new("roll", "first", noop()))
            .with_command(CommandSpec::new("roll", "second", noop()));
        assert_eq!(category.find("ROLL").unwrap().description(), "first");
        assert!(category.find("flip").is_none());
    }

    #[test]
    fn test_handler_error_from_anyhow() {
        let error: HandlerError = anyhow::anyhow!("boom").into();
        assert!(matches!(error, HandlerError::Failed(_)));
        assert_eq!(error.to_string(), "boom");
    }

    #[test]
    fn test_missing_permission_display() {
        let error = HandlerError::MissingPermission(Permission::ManageMessages);
        assert_eq!(error.to_string(), "missing permission manage-messages");
    }
}
