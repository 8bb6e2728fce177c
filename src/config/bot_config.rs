// Bot configuration, read from the environment once at startup.
//
// `from_env` is a thin wrapper over `from_lookup`, so parsing can be tested
// without touching process-wide environment variables.

use crate::core::dispatch::DispatchPolicy;
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("{0} requires DEV_GUILD_ID to be set")]
    DevGuildRequired(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMode {
    /// Commands are deployed globally.
    Prod,
    /// Commands are deployed to the dev guild only.
    Dev,
}

impl FromStr for BotMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Ok(Self::Prod),
            "dev" | "development" => Ok(Self::Dev),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownBackend {
    Memory,
    Sqlite,
}

impl FromStr for CooldownBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevConfig {
    pub users: HashSet<u64>,
    pub guild_id: Option<u64>,
    pub override_permissions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    pub mode: BotMode,
    pub dev: DevConfig,
    pub cooldown_backend: CooldownBackend,
    pub data_dir: PathBuf,
    pub paginator_timeout: Duration,
    /// Where audit embeds go. Audit listeners only log when unset.
    pub mod_log_channel: Option<u64>,
    /// Where new members are greeted. Falls back to the guild system channel.
    pub welcome_channel: Option<u64>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let mode = parse_or(get("BOT_MODE"), "BOT_MODE", BotMode::Prod)?;
        let cooldown_backend =
            parse_or(get("COOLDOWN_BACKEND"), "COOLDOWN_BACKEND", CooldownBackend::Memory)?;

        let users = match get("DEV_USERS") {
            Some(raw) => parse_id_list(&raw)?,
            None => HashSet::new(),
        };
        let guild_id = get("DEV_GUILD_ID")
            .map(|raw| parse_value::<u64>(&raw, "DEV_GUILD_ID"))
            .transpose()?;
        let override_permissions = match get("DEV_OVERRIDE_PERMISSIONS") {
            Some(raw) => parse_bool(&raw, "DEV_OVERRIDE_PERMISSIONS")?,
            None => false,
        };

        if guild_id.is_none() {
            if mode == BotMode::Dev {
                return Err(ConfigError::DevGuildRequired("BOT_MODE=dev"));
            }
            if override_permissions {
                return Err(ConfigError::DevGuildRequired("DEV_OVERRIDE_PERMISSIONS"));
            }
        }

        let data_dir = get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let timeout_secs = get("PAGINATOR_TIMEOUT_SECS")
            .map(|raw| parse_value::<u64>(&raw, "PAGINATOR_TIMEOUT_SECS"))
            .transpose()?
            .unwrap_or(30);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "PAGINATOR_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let mod_log_channel = get("MOD_LOG_CHANNEL_ID")
            .map(|raw| parse_value::<u64>(&raw, "MOD_LOG_CHANNEL_ID"))
            .transpose()?;
        let welcome_channel = get("WELCOME_CHANNEL_ID")
            .map(|raw| parse_value::<u64>(&raw, "WELCOME_CHANNEL_ID"))
            .transpose()?;

        Ok(Self {
            token,
            mode,
            dev: DevConfig {
                users,
                guild_id,
                override_permissions,
            },
            cooldown_backend,
            data_dir,
            paginator_timeout: Duration::from_secs(timeout_secs),
            mod_log_channel,
            welcome_channel,
        })
    }

    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            override_permissions: self.dev.override_permissions,
            privileged_actors: self.dev.users.clone(),
            restricted_context: self.dev.guild_id,
        }
    }

    pub fn cooldown_db_path(&self) -> PathBuf {
        self.data_dir.join("cooldowns.db")
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(raw: &str, key: &'static str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

fn parse_bool(raw: &str, key: &'static str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}

fn parse_id_list(raw: &str) -> Result<HashSet<u64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_value::<u64>(part, "DEV_USERS"))
        .collect()
}
