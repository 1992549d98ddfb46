//! User-facing texts produced by the dispatcher itself.

use crate::{
    permissions::PermissionSet,
    platform::{Channel, emoji},
};

/// Formats the notice sent when a command fails unexpectedly.
///
/// # Examples
///
/// ```
/// # use commandeer::dispatch::responses::format_error_notice;
/// assert!(format_error_notice().contains("error occurred"));
/// ```
pub fn format_error_notice() -> String {
    format!("{} An error occurred while processing the command.", emoji::X)
}

/// Formats the list of missing permissions behind a leading emoji.
///
/// # Examples
///
/// ```
/// # use commandeer::dispatch::responses::format_missing_permissions;
/// # use commandeer::permissions::{Permission, PermissionSet};
/// let missing = PermissionSet::from([Permission::EmbedLinks]);
/// assert_eq!(
///     format_missing_permissions("❌", &missing),
///     "❌ Missing permission, `embed-links`"
/// );
/// ```
pub fn format_missing_permissions(leading_emoji: &str, missing: &PermissionSet) -> String {
    let plural = match missing.len() {
        1 => "",
        _ => "s",
    };
    format!(
        "{} Missing permission{}, `{}`",
        leading_emoji, plural, missing
    )
}

/// Formats a warning sent by direct message, naming the channel it concerns.
pub fn format_direct_warning(warning: &str, channel: &Channel) -> String {
    format!("{} in {}", warning, channel.mention())
}
