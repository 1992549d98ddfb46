//! Emoji used in reactions and user-facing messages.

/// Acknowledges a successful command
pub const WHITE_CHECK_MARK: &str = "✅";
/// Prefixes failure messages
pub const X: &str = "❌";
/// Signals a degraded response caused by missing permissions
pub const WARNING: &str = "⚠️";
/// Marks owner-only commands in the help listing
pub const CROWN: &str = "👑";
/// Marks regular commands in the help listing
pub const GEAR: &str = "⚙️";
