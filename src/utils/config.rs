//! Bot configuration read from the environment (after `.env` has been loaded).

use std::env;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_PREFIX: &str = "+";
const DEFAULT_IDLE_TIMEOUT_SECS: u32 = 60;
const DEFAULT_OLLAMA_HOST: &str = "http://localhost";
const DEFAULT_OLLAMA_PORT: u16 = 11434;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not specified in env")]
    Missing(&'static str),

    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub discord_token: String,
    pub command_prefix: String,
    /// Seconds without playback before the bot leaves voice
    pub idle_timeout_secs: u32,
    pub ollama_host: String,
    pub ollama_port: u16,
    /// Chat is disabled when no model is configured
    pub ollama_model: Option<String>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let idle_timeout_secs = match get("IDLE_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u32>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "IDLE_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => DEFAULT_IDLE_TIMEOUT_SECS,
        };

        let ollama_port = match get("OLLAMA_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "OLLAMA_PORT",
                value,
            })?,
            None => DEFAULT_OLLAMA_PORT,
        };

        let ollama_model = get("OLLAMA_MODEL");
        if ollama_model.is_none() {
            warn!("OLLAMA_MODEL environment variable not set, chat is disabled");
        }

        let config = Self {
            discord_token,
            command_prefix: get("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            idle_timeout_secs,
            ollama_host: get("OLLAMA_HOST").unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
            ollama_port,
            ollama_model,
        };
        debug!(
            "Loaded config: prefix '{}', idle timeout {}s, ollama at {}:{}",
            config.command_prefix, config.idle_timeout_secs, config.ollama_host, config.ollama_port
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "secret")])).unwrap();

        assert_eq!(
            config,
            BotConfig {
                discord_token: "secret".to_string(),
                command_prefix: "+".to_string(),
                idle_timeout_secs: 60,
                ollama_host: "http://localhost".to_string(),
                ollama_port: 11434,
                ollama_model: None,
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "secret"),
            ("COMMAND_PREFIX", "!"),
            ("IDLE_TIMEOUT_SECS", "120"),
            ("OLLAMA_HOST", "http://ollama"),
            ("OLLAMA_PORT", "8080"),
            ("OLLAMA_MODEL", "llama3"),
        ]))
        .unwrap();

        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.idle_timeout_secs, 120);
        assert_eq!(config.ollama_host, "http://ollama");
        assert_eq!(config.ollama_port, 8080);
        assert_eq!(config.ollama_model.as_deref(), Some("llama3"));
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(
            BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "  ")])),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        );
    }

    #[test]
    fn test_invalid_numbers() {
        assert_matches!(
            BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "t"), ("IDLE_TIMEOUT_SECS", "0")])),
            Err(ConfigError::Invalid { key: "IDLE_TIMEOUT_SECS", .. })
        );
        assert_matches!(
            BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "t"), ("OLLAMA_PORT", "99999")])),
            Err(ConfigError::Invalid { key: "OLLAMA_PORT", .. })
        );
    }
}
