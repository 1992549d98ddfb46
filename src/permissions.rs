//! Platform capabilities held or required by the bot.
//!
//! A [`Permission`] is a single capability identifier and a [`PermissionSet`] is an
//! unordered collection of them. Sets compare independently of insertion order, and the
//! "missing" permissions of a requirement are always `required - held`.
//!
//! # Examples
//!
//! ```
//! use commandeer::permissions::{Permission, PermissionSet};
//!
//! let required = PermissionSet::from([Permission::SendMessages, Permission::EmbedLinks]);
//! let held = PermissionSet::from([Permission::SendMessages]);
//!
//! let missing = required.missing_from(&held);
//! assert_eq!(missing, PermissionSet::from([Permission::EmbedLinks]));
//! assert_eq!(missing.to_string(), "embed-links");
//! ```

use std::{collections::BTreeSet, fmt};

/// A single platform capability.
///
/// The declaration order is the order in which permissions are listed in user-facing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    Administrator,
    ManageChannels,
    ManageRoles,
    KickMembers,
    BanMembers,
    ReadMessages,
    SendMessages,
    ManageMessages,
    EmbedLinks,
    AttachFiles,
    ReadMessageHistory,
    MentionEveryone,
    UseExternalEmojis,
    AddReactions,
    Connect,
    Speak,
}

impl Permission {
    /// Returns the identifier shown to users, e.g. `read-message-history`.
    pub fn name(&self) -> &'static str {
        match self {
            Permission::Administrator => "administrator",
            Permission::ManageChannels => "manage-channels",
            Permission::ManageRoles => "manage-roles",
            Permission::KickMembers => "kick-members",
            Permission::BanMembers => "ban-members",
            Permission::ReadMessages => "read-messages",
            Permission::SendMessages => "send-messages",
            Permission::ManageMessages => "manage-messages",
            Permission::EmbedLinks => "embed-links",
            Permission::AttachFiles => "attach-files",
            Permission::ReadMessageHistory => "read-message-history",
            Permission::MentionEveryone => "mention-everyone",
            Permission::UseExternalEmojis => "use-external-emojis",
            Permission::AddReactions => "add-reactions",
            Permission::Connect => "connect",
            Permission::Speak => "speak",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unordered set of [`Permission`]s.
///
/// Iteration and [`Display`](fmt::Display) follow the declaration order of
/// [`Permission`], so messages built from a set are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        PermissionSet(BTreeSet::new())
    }

    /// The permissions needed to read a channel and post in it.
    pub fn send() -> Self {
        PermissionSet::from([Permission::ReadMessages, Permission::SendMessages])
    }

    /// Adds a permission, returning `true` if it was not already present.
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Returns `true` if every permission of `other` is in this set.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        other.0.is_subset(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Returns the permissions of this set that `held` does not contain.
    ///
    /// With `self` as the required set this is `required - held`.
    pub fn missing_from(&self, held: &PermissionSet) -> PermissionSet {
        PermissionSet(self.0.difference(&held.0).copied().collect())
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.iter().map(|p| p.name()).collect::<Vec<&str>>();
        f.write_str(&names.join(", "))
    }
}

impl<const N: usize> From<[Permission; N]> for PermissionSet {
    fn from(permissions: [Permission; N]) -> Self {
        PermissionSet(BTreeSet::from(permissions))
    }
}

impl From<Permission> for PermissionSet {
    fn from(permission: Permission) -> Self {
        PermissionSet::from([permission])
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        PermissionSet(iter.into_iter().collect())
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::collections::btree_set::IntoIter<Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
