//! Configuration of the command dispatcher.
//!
//! The configuration is read from a YAML file, merged with environment variables and
//! built-in defaults. Every key is optional.
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Prefix invoking commands when no per-guild prefix applies
//! default_prefix: "!"
//!
//! # Whether "@bot command" works like "!command"
//! allow_mention_as_prefix: true
//!
//! # Messages containing this marker never get a warning reaction;
//! # an empty marker disables the opt-out
//! warning_opt_out_marker: "--error"
//!
//! # Owner of the bot application, looked up on the platform when absent
//! bot_owner_id: "123456789"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Any key can be overridden with the `COMMANDEER_` prefix:
//!
//! ```bash
//! export COMMANDEER_DEFAULT_PREFIX="?"
//! export COMMANDEER_BOT_OWNER_ID="123456789"
//! ```

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration of a [`Dispatcher`](crate::dispatch::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix used when the prefix resolver has no better answer
    #[serde(deserialize_with = "lenient_string")]
    pub default_prefix: String,

    /// Accept a mention of the bot in place of the prefix
    pub allow_mention_as_prefix: bool,

    /// Substring which suppresses the warning-reaction tier when present in a message
    #[serde(deserialize_with = "lenient_string")]
    pub warning_opt_out_marker: String,

    /// Owner of the bot application.
    ///
    /// When `None`, the owner is fetched from the platform while building the dispatcher.
    #[serde(deserialize_with = "lenient_optional_string")]
    pub bot_owner_id: Option<String>,
}

/// A scalar read where a string is expected.
///
/// Environment values are parsed before extraction, so `COMMANDEER_BOT_OWNER_ID=1234`
/// arrives as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    String(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl From<Lenient> for String {
    fn from(value: Lenient) -> Self {
        match value {
            Lenient::String(value) => value,
            Lenient::Unsigned(value) => value.to_string(),
            Lenient::Signed(value) => value.to_string(),
            Lenient::Float(value) => value.to_string(),
            Lenient::Bool(value) => value.to_string(),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Lenient::deserialize(deserializer).map(String::from)
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Lenient>::deserialize(deserializer).map(|value| value.map(String::from))
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_prefix: "!".to_string(),
            allow_mention_as_prefix: true,
            warning_opt_out_marker: "--error".to_string(),
            bot_owner_id: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a YAML file and `COMMANDEER_` environment variables.
    ///
    /// A missing file is not an error, defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file is not valid YAML or a value has the wrong
    /// type.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use commandeer::config::Config;
    /// let config = Config::load("commandeer.yaml")?;
    /// println!("prefix: {}", config.default_prefix);
    /// # Ok::<(), figment::Error>(())
    /// ```
    pub fn load(path: &str) -> Result<Config, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("COMMANDEER_").split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/commandeer.yaml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_load_from_yaml() {
        let file = yaml_file(
            "default_prefix: \"?\"\n\
             allow_mention_as_prefix: false\n\
             warning_opt_out_marker: \"--quiet\"\n\
             bot_owner_id: \"owner-42\"\n",
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.default_prefix, "?");
        assert!(!config.allow_mention_as_prefix);
        assert_eq!(config.warning_opt_out_marker, "--quiet");
        assert_eq!(config.bot_owner_id.as_deref(), Some("owner-42"));
    }

    #[test]
    #[serial]
    fn test_partial_yaml_keeps_defaults() {
        let file = yaml_file("default_prefix: \"bot.\"\n");

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.default_prefix, "bot.");
        assert!(config.allow_mention_as_prefix);
        assert_eq!(config.warning_opt_out_marker, "--error");
        assert_eq!(config.bot_owner_id, None);
    }

    #[test]
    #[serial]
    fn test_env_overrides_yaml() {
        let file = yaml_file("default_prefix: \"?\"\n");
        unsafe {
            std::env::set_var("COMMANDEER_DEFAULT_PREFIX", "$");
            std::env::set_var("COMMANDEER_BOT_OWNER_ID", "owner-env");
        }

        let config = Config::load(file.path().to_str().unwrap());

        unsafe {
            std::env::remove_var("COMMANDEER_DEFAULT_PREFIX");
            std::env::remove_var("COMMANDEER_BOT_OWNER_ID");
        }

        let config = config.unwrap();
        assert_eq!(config.default_prefix, "$");
        assert_eq!(config.bot_owner_id.as_deref(), Some("owner-env"));
    }

    #[test]
    #[serial]
    fn test_numeric_env_values_are_read_as_strings() {
        unsafe {
            std::env::set_var("COMMANDEER_DEFAULT_PREFIX", "1");
            std::env::set_var("COMMANDEER_BOT_OWNER_ID", "123456789012345678");
        }

        let config = Config::load("/nonexistent/commandeer.yaml");

        unsafe {
            std::env::remove_var("COMMANDEER_DEFAULT_PREFIX");
            std::env::remove_var("COMMANDEER_BOT_OWNER_ID");
        }

        let config = config.unwrap();
        assert_eq!(config.default_prefix, "1");
        assert_eq!(config.bot_owner_id.as_deref(), Some("123456789012345678"));
    }

    #[test]
    #[serial]
    fn test_numeric_yaml_owner_id() {
        let file = yaml_file("bot_owner_id: 42\nwarning_opt_out_marker: \"--quiet\"\n");

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.bot_owner_id.as_deref(), Some("42"));
        assert_eq!(config.warning_opt_out_marker, "--quiet");
    }

    #[test]
    #[serial]
    fn test_invalid_value_is_an_error() {
        let file = yaml_file("allow_mention_as_prefix: \"maybe\"\n");
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }
}
