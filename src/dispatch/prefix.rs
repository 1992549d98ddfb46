//! Invocation prefix resolution.

/// Decides which prefix invokes commands in a given context.
///
/// The default implementation, [`DefaultPrefixResolver`], always answers with the
/// dispatcher's default prefix. Hosts storing per-guild prefixes provide their own
/// implementation.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use commandeer::dispatch::PrefixResolver;
///
/// struct GuildPrefixes(HashMap<String, String>);
///
/// impl PrefixResolver for GuildPrefixes {
///     fn resolve(&self, guild_id: Option<&str>, default_prefix: &str) -> String {
///         guild_id
///             .and_then(|id| self.0.get(id))
///             .cloned()
///             .unwrap_or_else(|| default_prefix.to_owned())
///     }
/// }
/// ```
pub trait PrefixResolver: Send + Sync {
    /// Returns the prefix for a guild, or for direct messages when `guild_id` is `None`.
    fn resolve(&self, guild_id: Option<&str>, default_prefix: &str) -> String;

    /// Returns `true` if mentioning the bot may replace the prefix in this context.
    ///
    /// Only consulted while mention prefixes are enabled in the dispatcher settings.
    fn mention_allowed(&self, _guild_id: Option<&str>) -> bool {
        true
    }
}

/// Resolves every context to the default prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPrefixResolver;

impl PrefixResolver for DefaultPrefixResolver {
    fn resolve(&self, _guild_id: Option<&str>, default_prefix: &str) -> String {
        default_prefix.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolver_ignores_guild() {
        let resolver = DefaultPrefixResolver;
        assert_eq!(resolver.resolve(Some("g1"), "!"), "!");
        assert_eq!(resolver.resolve(None, "?"), "?");
        assert!(resolver.mention_allowed(None));
    }
}
