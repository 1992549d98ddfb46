//! Registered command categories and alias resolution.
//!
//! The registry is read on every inbound message and written only when a host adds or
//! removes categories. Writers replace the category list as a whole, so a lookup always
//! sees a consistent snapshot without holding the lock while it searches.

use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use crate::commands::{CommandCategory, CommandSpec};

/// The registered categories at one point in time, in registration order.
pub type Snapshot = Arc<Vec<Arc<CommandCategory>>>;

/// Resolves a command token to the first matching command of `categories`.
pub fn find_command(
    categories: &[Arc<CommandCategory>],
    token: &str,
) -> Option<Arc<CommandSpec>> {
    let found = categories
        .iter()
        .find_map(|category| category.find(token))
        .cloned();

    if found.is_none() {
        debug!("no command matches {}", token);
    }
    found
}

/// Ordered set of registered [`CommandCategory`]s.
///
/// # Duplicate aliases
///
/// Aliases do not need to be unique across commands. When several commands match a
/// token, the first one in registration order wins and the others are unreachable through
/// that alias. This is a configuration hazard: nothing warns about it.
///
/// # Examples
///
/// ```
/// use commandeer::commands::{
///     CommandCategory, CommandRegistry, CommandResult, CommandSpec, handler_fn,
/// };
///
/// let registry = CommandRegistry::new();
/// registry.add_categories([CommandCategory::single(CommandSpec::new(
///     "ping",
///     "Replies with pong",
///     handler_fn(|_| Ok(CommandResult::message("pong"))),
/// ))]);
///
/// assert!(registry.find("PING").is_some());
/// registry.remove_category("ping");
/// assert!(registry.find("ping").is_none());
/// ```
#[derive(Debug, Default)]
pub struct CommandRegistry {
    categories: RwLock<Snapshot>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry::default()
    }

    /// Appends categories after the already registered ones.
    pub fn add_categories(&self, categories: impl IntoIterator<Item = CommandCategory>) {
        let added = categories.into_iter().map(Arc::new).collect::<Vec<_>>();
        if added.is_empty() {
            return;
        }

        let mut guard = self.categories.write();
        let mut next = guard.iter().cloned().collect::<Vec<_>>();
        for category in added {
            info!(
                "register category {} ({} commands)",
                category.name(),
                category.commands().len()
            );
            next.push(category);
        }
        *guard = Arc::new(next);
    }

    /// Removes every category with the given name, ignoring case.
    ///
    /// Returns the number of removed categories.
    pub fn remove_category(&self, name: &str) -> usize {
        let lowercase = name.to_lowercase();
        let mut guard = self.categories.write();

        let next = guard
            .iter()
            .filter(|category| category.name().to_lowercase() != lowercase)
            .cloned()
            .collect::<Vec<_>>();
        let removed = guard.len() - next.len();

        if removed > 0 {
            info!("unregister category {} ({} removed)", name, removed);
            *guard = Arc::new(next);
        }

        removed
    }

    /// Returns the categories registered at the time of the call.
    pub fn snapshot(&self) -> Snapshot {
        self.categories.read().clone()
    }

    /// Resolves a command token to the first matching command across all categories.
    pub fn find(&self, token: &str) -> Option<Arc<CommandSpec>> {
        find_command(&self.snapshot(), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandResult, handler_fn};

    fn spec(name: &str, description: &str) -> CommandSpec {
        CommandSpec::new(
            name,
            description,
            handler_fn(|_| Ok(CommandResult::handled())),
        )
    }

    fn resolvable(registry: &CommandRegistry, tokens: &[&str]) -> Vec<Option<String>> {
        tokens
            .iter()
            .map(|token| registry.find(token).map(|c| c.description().to_owned()))
            .collect()
    }

    #[test]
    fn test_find_across_categories() {
        let registry = CommandRegistry::new();
        registry.add_categories([
            CommandCategory::new("Fun", "").with_command(spec("roll", "roll")),
            CommandCategory::new("Admin", "").with_command(spec("kick", "kick")),
        ]);

        assert_eq!(registry.find("KICK").unwrap().name(), "kick");
        assert_eq!(registry.find("roll").unwrap().name(), "roll");
        assert!(registry.find("ban").is_none());
    }

    #[test]
    fn test_find_command_in_snapshot_ignores_later_removal() {
        let registry = CommandRegistry::new();
        registry.add_categories([CommandCategory::single(spec("ping", "ping"))]);
        let snapshot = registry.snapshot();

        registry.remove_category("ping");

        assert!(registry.find("ping").is_none());
        assert_eq!(find_command(&snapshot, "PING").unwrap().name(), "ping");
    }

    #[test]
    fn test_first_registered_alias_wins() {
        let registry = CommandRegistry::new();
        registry.add_categories([CommandCategory::single(spec("info", "first"))]);
        registry.add_categories([CommandCategory::single(spec("info", "second"))]);

        assert_eq!(registry.find("info").unwrap().description(), "first");
    }

    #[test]
    fn test_register_then_unregister_restores_resolvable_set() {
        let registry = CommandRegistry::new();
        registry.add_categories([CommandCategory::new("Base", "")
            .with_command(spec("ping", "ping"))
            .with_command(spec("info", "info"))]);
        let tokens = ["ping", "info", "extra", "other"];
        let before = resolvable(&registry, &tokens);

        registry.add_categories([CommandCategory::new("Extra", "")
            .with_command(spec("extra", "extra"))
            .with_command(spec("ping", "shadowed"))]);
        assert_eq!(registry.find("extra").unwrap().name(), "extra");
        assert_eq!(registry.remove_category("extra"), 1);

        assert_eq!(resolvable(&registry, &tokens), before);
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_remove_unknown_category_is_noop() {
        let registry = CommandRegistry::new();
        registry.add_categories([CommandCategory::single(spec("ping", "ping"))]);
        let before = registry.snapshot();

        assert_eq!(registry.remove_category("nope"), 0);
        assert!(Arc::ptr_eq(&before, &registry.snapshot()));
    }

    #[test]
    fn test_snapshot_unaffected_by_later_writes() {
        let registry = CommandRegistry::new();
        registry.add_categories([CommandCategory::single(spec("ping", "ping"))]);
        let snapshot = registry.snapshot();

        registry.remove_category("ping");

        assert_eq!(snapshot.len(), 1);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_concurrent_lookups_and_writes() {
        let registry = Arc::new(CommandRegistry::new());
        registry.add_categories([CommandCategory::single(spec("ping", "ping"))]);

        let readers = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        assert!(registry.find("ping").is_some());
                    }
                })
            })
            .collect::<Vec<_>>();

        for i in 0..100 {
            let name = format!("tmp{}", i);
            registry.add_categories([CommandCategory::single(spec(&name, "tmp"))]);
            registry.remove_category(&name);
        }

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(registry.snapshot().len(), 1);
    }
}
