//! Runtime settings of a dispatcher.
//!
//! Settings start from the [`Config`] and stay mutable while events are processed. Every
//! read sees either the old or the new value of a setting, never a mix.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::RwLock;

use crate::config::Config;

/// Decides whether a triggering message opted out of warning reactions.
pub type OptOutPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Mutable settings shared by all pipeline stages.
pub struct Settings {
    default_prefix: RwLock<String>,
    allow_mention_as_prefix: AtomicBool,
    warning_opt_out: RwLock<OptOutPredicate>,
}

impl Settings {
    /// Builds settings from configuration.
    ///
    /// The warning opt-out predicate matches messages containing
    /// [`Config::warning_opt_out_marker`]; an empty marker never matches.
    pub fn from_config(config: &Config) -> Self {
        let marker = config.warning_opt_out_marker.clone();
        let warning_opt_out: OptOutPredicate =
            Arc::new(move |content: &str| !marker.is_empty() && content.contains(&marker));

        Settings {
            default_prefix: RwLock::new(config.default_prefix.clone()),
            allow_mention_as_prefix: AtomicBool::new(config.allow_mention_as_prefix),
            warning_opt_out: RwLock::new(warning_opt_out),
        }
    }

    pub fn default_prefix(&self) -> String {
        self.default_prefix.read().clone()
    }

    pub fn set_default_prefix(&self, prefix: &str) {
        *self.default_prefix.write() = prefix.to_owned();
    }

    pub fn allow_mention_as_prefix(&self) -> bool {
        self.allow_mention_as_prefix.load(Ordering::Relaxed)
    }

    pub fn set_allow_mention_as_prefix(&self, allow: bool) {
        self.allow_mention_as_prefix.store(allow, Ordering::Relaxed);
    }

    /// Returns `true` if the message content suppresses the warning-reaction tier.
    pub fn is_warning_opted_out(&self, content: &str) -> bool {
        let predicate = self.warning_opt_out.read().clone();
        predicate(content)
    }

    /// Replaces the warning opt-out predicate.
    pub fn set_warning_opt_out<F>(&self, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        *self.warning_opt_out.write() = Arc::new(predicate);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_config(&Config::default())
    }
}
