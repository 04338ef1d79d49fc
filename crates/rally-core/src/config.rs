use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::DEFAULT_LOOKAHEAD_WEEKS;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// How many weeks ahead invitations are materialized.
    pub lookahead_weeks: u32,
    /// Seconds between materialization sweeps. A single sweep runs when unset.
    pub sweep_interval_secs: Option<u64>,
}

/// Clubs whose recurring events the sweeper keeps materialized.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub club_ids: Vec<uuid::Uuid>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            lookahead_weeks: DEFAULT_LOOKAHEAD_WEEKS,
            sweep_interval_secs: None,
        }
    }
}

impl ScheduleConfig {
    /// ## Summary
    /// Returns the sweep interval, if periodic sweeping is enabled.
    #[must_use]
    pub fn sweep_interval(&self) -> Option<std::time::Duration> {
        self.sweep_interval_secs
            .filter(|secs| *secs > 0)
            .map(std::time::Duration::from_secs)
    }
}

/// Prefix shared by every environment variable the settings read.
pub const ENV_PREFIX: &str = "RALLY";

/// ## Summary
/// The environment source for `Settings`.
///
/// Variables look like `RALLY_SCHEDULE__LOOKAHEAD_WEEKS`: a single `_` after
/// the prefix and `__` between sections, so key names keep their own
/// underscores. `RALLY_SYNC__CLUB_IDS` takes a comma-separated list.
#[must_use]
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .convert_case(config::Case::Snake)
        .ignore_empty(true)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("sync.club_ids")
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::load_from(environment())
    }

    /// ## Summary
    /// Loads settings with `env` in place of the process environment.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load_from(env: config::Environment) -> Result<Self> {
        Ok(Config::builder()
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "debug")?
            .set_default(
                "schedule.lookahead_weeks",
                i64::from(DEFAULT_LOOKAHEAD_WEEKS),
            )?
            // Env file
            .add_source(env)
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
