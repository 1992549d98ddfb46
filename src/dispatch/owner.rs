//! Process-wide bot owner identity.
//!
//! The owner must be loaded before the first event is dispatched; the
//! [`DispatcherBuilder`](crate::dispatch::DispatcherBuilder) does so. Reloading replaces
//! a single value, and concurrent readers see either the previous or the new owner.

use log::info;
use parking_lot::RwLock;

use crate::platform::Platform;

/// Holds the user id of the bot application's owner.
#[derive(Debug, Default)]
pub struct BotOwner {
    id: RwLock<Option<String>>,
}

impl BotOwner {
    pub fn new() -> Self {
        BotOwner::default()
    }

    /// Returns the owner id, `None` until loaded.
    pub fn get(&self) -> Option<String> {
        self.id.read().clone()
    }

    pub fn set(&self, id: &str) {
        info!("bot owner set to {}", id);
        *self.id.write() = Some(id.to_owned());
    }

    /// Returns `true` if `user_id` is the loaded owner.
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.id.read().as_deref() == Some(user_id)
    }

    /// Fetches the owner from the platform and stores it.
    ///
    /// # Errors
    ///
    /// Returns the platform lookup error; the previous owner is kept in that case.
    pub async fn reload(&self, platform: &dyn Platform) -> anyhow::Result<String> {
        let id = platform.application_owner_id().await?;
        self.set(&id);
        Ok(id)
    }
}
