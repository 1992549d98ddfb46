//! Message event preprocessing.
//!
//! Turns a raw [`MessageEvent`] into a matched command and its [`CommandInvocation`], or
//! silently discards it.
//!
//! # Tokenization
//!
//! Content is split on single spaces with no quoting or escaping. Consecutive spaces
//! produce empty tokens; trailing empty tokens are dropped.
//!
//! ```text
//! "!ping extra arg"  → command "ping", arguments ["extra", "arg"]
//! "<@1> ping"        → command "ping", arguments []
//! "!ping a  b"       → command "ping", arguments ["a", "", "b"]
//! ```

use std::sync::Arc;

use log::debug;

use crate::{
    commands::{CommandInvocation, CommandSpec, find_command},
    dispatch::DispatchScope,
    platform::MessageEvent,
};

/// Matches inbound messages against registered commands.
pub trait EventPreprocessor: Send + Sync {
    /// Returns the matched command and its invocation, `None` to discard the event.
    fn preprocess(
        &self,
        event: &MessageEvent,
        scope: &DispatchScope<'_>,
    ) -> Option<(Arc<CommandSpec>, CommandInvocation)>;
}

/// Prefix or mention matching followed by alias lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEventPreprocessor;

/// Splits message content on single spaces.
fn tokenize(content: &str) -> Vec<String> {
    let mut tokens = content.split(' ').map(str::to_owned).collect::<Vec<String>>();
    while tokens.last().is_some_and(String::is_empty) {
        tokens.pop();
    }
    tokens
}

impl EventPreprocessor for DefaultEventPreprocessor {
    fn preprocess(
        &self,
        event: &MessageEvent,
        scope: &DispatchScope<'_>,
    ) -> Option<(Arc<CommandSpec>, CommandInvocation)> {
        let content = event.content.as_str();
        let guild_id = event.guild_id.as_deref();

        let prefix = scope
            .prefix_resolver
            .resolve(guild_id, &scope.settings.default_prefix());
        let mention = scope.platform.self_mention(event);

        let mention_prefix = content.contains(' ')
            && content.starts_with(&mention)
            && scope.settings.allow_mention_as_prefix()
            && scope.prefix_resolver.mention_allowed(guild_id);

        if !mention_prefix && !content.starts_with(&prefix) {
            return None;
        }

        let mut arguments = tokenize(content);
        if mention_prefix && !arguments.is_empty() {
            arguments.remove(0);
        }
        if arguments.is_empty() {
            debug!("ignore message {}, no command token", event.message_id);
            return None;
        }

        let first = arguments.remove(0);
        let token = match mention_prefix {
            true => first,
            false => first.strip_prefix(prefix.as_str()).unwrap_or(&first).to_owned(),
        };

        let command = find_command(scope.categories, &token)?;
        debug!(
            "message {} invokes command {} (edited: {})",
            event.message_id,
            command.name(),
            event.edited
        );

        let prefix = match mention_prefix {
            true => format!("{} ", mention),
            false => prefix,
        };

        Some((
            command,
            CommandInvocation {
                event: event.clone(),
                arguments,
                prefix,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commands::{CommandCategory, CommandRegistry, CommandResult, handler_fn},
        dispatch::{BotOwner, DefaultPrefixResolver, Settings},
        platform::{Channel, MockPlatform},
    };

    struct Fixture {
        platform: MockPlatform,
        registry: CommandRegistry,
        settings: Settings,
        bot_owner: BotOwner,
    }

    impl Fixture {
        fn new() -> Self {
            let mut platform = MockPlatform::new();
            platform
                .expect_self_mention()
                .returning(|_| "<@42>".to_string());

            let registry = CommandRegistry::new();
            registry.add_categories([
                CommandCategory::new("Utility", "")
                    .with_command(CommandSpec::new(
                        "ping",
                        "",
                        handler_fn(|_| Ok(CommandResult::message("pong"))),
                    ))
                    .with_command(
                        CommandSpec::new(
                            "ban",
                            "",
                            handler_fn(|_| Ok(CommandResult::check_mark())),
                        )
                        .with_aliases(["ban <user>", "b"]),
                    ),
            ]);

            Fixture {
                platform,
                registry,
                settings: Settings::default(),
                bot_owner: BotOwner::new(),
            }
        }

        fn run(&self, content: &str) -> Option<(Arc<CommandSpec>, CommandInvocation)> {
            let categories = self.registry.snapshot();
            let scope = DispatchScope {
                platform: &self.platform,
                categories: &categories,
                settings: &self.settings,
                prefix_resolver: &DefaultPrefixResolver,
                bot_owner: &self.bot_owner,
            };
            DefaultEventPreprocessor.preprocess(&event(content), &scope)
        }
    }

    fn event(content: &str) -> MessageEvent {
        MessageEvent {
            message_id: "m1".to_string(),
            content: content.to_string(),
            author_id: "u1".to_string(),
            guild_id: Some("g1".to_string()),
            member: None,
            channel: Channel::guild_text("c1"),
            edited: false,
        }
    }

    fn command_name(result: Option<(Arc<CommandSpec>, CommandInvocation)>) -> Option<String> {
        result.map(|(command, _)| command.name().to_owned())
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("!ping"), vec!["!ping"]);
        assert_eq!(tokenize("!ping a b"), vec!["!ping", "a", "b"]);
        assert_eq!(tokenize("!ping a  b "), vec!["!ping", "a", "", "b"]);
    }

    #[test]
    fn test_prefix_match_ignores_case() {
        let fixture = Fixture::new();
        assert_eq!(command_name(fixture.run("!ping")).as_deref(), Some("ping"));
        assert_eq!(command_name(fixture.run("!PING")).as_deref(), Some("ping"));
        assert_eq!(command_name(fixture.run("!pinger")), None);
    }

    #[test]
    fn test_arguments_follow_command_token() {
        let fixture = Fixture::new();
        let (_, invocation) = fixture.run("!ping extra arg").unwrap();
        assert_eq!(invocation.arguments, vec!["extra", "arg"]);
        assert_eq!(invocation.prefix, "!");
        assert!(!invocation.edited());
    }

    #[test]
    fn test_mention_prefix() {
        let fixture = Fixture::new();
        let (command, invocation) = fixture.run("<@42> ping").unwrap();
        assert_eq!(command.name(), "ping");
        assert!(invocation.arguments.is_empty());
        assert_eq!(invocation.prefix, "<@42> ");
    }

    #[test]
    fn test_mention_without_space_is_not_a_prefix() {
        let fixture = Fixture::new();
        assert!(fixture.run("<@42>ping").is_none());
        assert!(fixture.run("<@42>").is_none());
    }

    #[test]
    fn test_mention_with_trailing_space_only() {
        let fixture = Fixture::new();
        assert!(fixture.run("<@42> ").is_none());
    }

    #[test]
    fn test_mention_prefix_disabled() {
        let fixture = Fixture::new();
        fixture.settings.set_allow_mention_as_prefix(false);
        assert!(fixture.run("<@42> ping").is_none());
        assert!(fixture.run("!ping").is_some());
    }

    #[test]
    fn test_alias_with_argument_hints() {
        let fixture = Fixture::new();
        let (command, invocation) = fixture.run("!BAN someone").unwrap();
        assert_eq!(command.name(), "ban");
        assert_eq!(invocation.arguments, vec!["someone"]);
        assert_eq!(command_name(fixture.run("!b x")).as_deref(), Some("ban"));
        assert!(fixture.run("!<user>").is_none());
    }

    #[test]
    fn test_messages_without_prefix_are_ignored() {
        let fixture = Fixture::new();
        assert!(fixture.run("ping").is_none());
        assert!(fixture.run("hello !ping").is_none());
        assert!(fixture.run("").is_none());
    }

    #[test]
    fn test_custom_default_prefix() {
        let fixture = Fixture::new();
        fixture.settings.set_default_prefix("bot.");
        assert_eq!(command_name(fixture.run("bot.ping")).as_deref(), Some("ping"));
        assert!(fixture.run("!ping").is_none());
    }

    #[test]
    fn test_prefix_is_matched_literally() {
        let fixture = Fixture::new();
        fixture.settings.set_default_prefix(".*");
        assert_eq!(command_name(fixture.run(".*ping")).as_deref(), Some("ping"));
        assert!(fixture.run("xxping").is_none());
    }
}
