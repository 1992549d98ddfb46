//! Help command.
//!
//! Lists the registered commands visible to the invoking user. Commands that would be
//! silently dropped for this user (guild-only commands in a direct message, owner-only
//! commands for anyone but the owner) are never listed.
//!
//! - `help` lists categories, smallest first
//! - `help <category>` lists the commands of one category

use async_trait::async_trait;
use log::debug;

use crate::{
    commands::{
        CommandCategory, CommandContext, CommandHandler, CommandProperty, CommandResult,
        CommandSpec, HandlerError,
    },
    platform::emoji,
};

/// Name of the category registered by [`help_category`].
pub const HELP_CATEGORY: &str = "Help";

const DESCRIPTION: &str = "Gets the list of commands";
const LEGEND: &str = "**[] = optional, <> = required**";

/// Handler of the help command.
pub struct HelpCommand;

/// Returns the single-command category holding the help command.
///
/// # Examples
///
/// ```
/// use commandeer::commands::help::help_category;
///
/// let category = help_category();
/// assert_eq!(category.name(), "Help");
/// assert!(category.find("HELP").is_some());
/// ```
pub fn help_category() -> CommandCategory {
    CommandCategory::new(HELP_CATEGORY, DESCRIPTION).with_command(
        CommandSpec::new("help", DESCRIPTION, HelpCommand).with_aliases(["help [category]"]),
    )
}

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn execute(&self, context: &CommandContext) -> Result<CommandResult, HandlerError> {
        debug!("handling help command");

        let response = match context.invocation.arguments.first() {
            Some(name) => format_category_help(context, name),
            None => format_overview(context),
        };

        Ok(CommandResult::Message(response))
    }
}

fn visible_commands<'a>(
    context: &CommandContext,
    category: &'a CommandCategory,
) -> Vec<&'a CommandSpec> {
    let in_guild = context.invocation.guild_id().is_some();
    let is_owner = context.is_bot_owner();

    category
        .commands()
        .iter()
        .map(|command| &**command)
        .filter(|command| command.is_visible(in_guild, is_owner))
        .collect()
}

fn format_command_line(command: &CommandSpec, prefix: &str) -> String {
    let marker = match command.has_property(CommandProperty::BotOwnerOnly) {
        true => emoji::CROWN,
        false => emoji::GEAR,
    };

    format!(
        "{} `{}{}` {}\n",
        marker,
        prefix,
        command.display_alias(),
        command.description()
    )
}

fn format_overview(context: &CommandContext) -> String {
    let prefix = &context.invocation.prefix;

    let mut listed = context
        .categories
        .iter()
        .map(|category| (category, visible_commands(context, category)))
        .filter(|(_, commands)| !commands.is_empty())
        .collect::<Vec<_>>();
    // Stable sort, registration order breaks ties
    listed.sort_by_key(|(_, commands)| commands.len());

    let body = listed
        .into_iter()
        .map(|(category, commands)| match commands.as_slice() {
            [command] => format!(
                "**{}** {}",
                category.name(),
                format_command_line(command, prefix)
            ),
            _ => format!("**{}** {}\n", category.name(), category.description()),
        })
        .collect::<String>();

    format!("__**Help**__\n\n{}\n{}", body, LEGEND)
}

fn format_category_help(context: &CommandContext, name: &str) -> String {
    let name = name.to_lowercase();
    let Some(category) = context
        .categories
        .iter()
        .find(|category| category.name().to_lowercase() == name)
    else {
        return format!("{} Category not found", emoji::X);
    };

    let body = visible_commands(context, category)
        .into_iter()
        .map(|command| format_command_line(command, &context.invocation.prefix))
        .collect::<String>();

    format!("__**{} help**__\n\n{}\n{}", category.name(), body, LEGEND)
}
