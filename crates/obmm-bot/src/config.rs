//! Application configuration.

use obmm_core::{OwnerId, TierTable};
use obmm_engine::EngineConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Quote against the simulated feed, log submissions, send nothing.
    #[default]
    DryRun,
    /// Live trading; requires a wired order gateway.
    Live,
}

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Instrument label, e.g. "SOL/USDC".
    #[serde(default = "default_instrument")]
    pub instrument: String,

    #[serde(default)]
    pub mode: OperatingMode,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub tiers: TiersConfig,

    #[serde(default)]
    pub sim: SimConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instrument: default_instrument(),
            mode: OperatingMode::default(),
            engine: EngineConfig::default(),
            feed: FeedConfig::default(),
            dispatch: DispatchConfig::default(),
            tiers: TiersConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            book_poll_ms: default_book_poll_ms(),
            reference_poll_ms: default_reference_poll_ms(),
            lean_interval_ms: default_lean_interval_ms(),
        }
    }
}

/// Timer cadences for the three recurring loops plus the decision tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Decision tick period.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Order-book poll period.
    #[serde(default = "default_book_poll_ms")]
    pub book_poll_ms: u64,
    /// Reference-price poll period.
    #[serde(default = "default_reference_poll_ms")]
    pub reference_poll_ms: u64,
    /// Balance refresh / leaning cycle period.
    #[serde(default = "default_lean_interval_ms")]
    pub lean_interval_ms: u64,
}

/// Dispatcher pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_depth: default_queue_depth(),
        }
    }
}

/// Participant tier tables, static for the life of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiersConfig {
    /// Our own open-orders identities.
    #[serde(default = "default_self_owned")]
    pub self_owned: Vec<String>,
    /// Known competing market makers.
    #[serde(default)]
    pub competitors: Vec<String>,
    /// Known toxic flow sources.
    #[serde(default)]
    pub predators: Vec<String>,
}

impl Default for TiersConfig {
    fn default() -> Self {
        Self {
            self_owned: default_self_owned(),
            competitors: Vec::new(),
            predators: Vec::new(),
        }
    }
}

impl TiersConfig {
    pub fn tier_table(&self) -> TierTable {
        TierTable::new(
            self.self_owned.iter().map(|s| OwnerId::from(s.clone())),
            self.competitors.iter().map(|s| OwnerId::from(s.clone())),
            self.predators.iter().map(|s| OwnerId::from(s.clone())),
        )
    }
}

/// Simulated feed parameters for dry-run mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Starting midpoint price.
    #[serde(default = "default_sim_start_price")]
    pub start_price: Decimal,
    /// Reference confidence half-width.
    #[serde(default = "default_sim_confidence")]
    pub confidence: Decimal,
    /// Simulated quote-asset balance.
    #[serde(default = "default_sim_quote_balance")]
    pub quote_balance: Decimal,
    /// Simulated base-asset balance.
    #[serde(default = "default_sim_base_balance")]
    pub base_balance: Decimal,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_price: default_sim_start_price(),
            confidence: default_sim_confidence(),
            quote_balance: default_sim_quote_balance(),
            base_balance: default_sim_base_balance(),
        }
    }
}

impl AppConfig {
    /// Load configuration: OBMM_CONFIG env var, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("OBMM_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the parts the engine cannot check itself.
    pub fn validate(&self) -> AppResult<()> {
        self.engine.validate()?;
        if self.tiers.self_owned.is_empty() {
            return Err(AppError::Config(
                "tiers.self_owned must name at least one identity".into(),
            ));
        }
        if self.feed.tick_interval_ms == 0 {
            return Err(AppError::Config("feed.tick_interval_ms must be > 0".into()));
        }
        Ok(())
    }
}

fn default_instrument() -> String {
    "SOL/USDC".to_string()
}
fn default_tick_interval_ms() -> u64 {
    165
}
fn default_book_poll_ms() -> u64 {
    210
}
fn default_reference_poll_ms() -> u64 {
    190
}
fn default_lean_interval_ms() -> u64 {
    9_000
}
fn default_workers() -> usize {
    4
}
fn default_queue_depth() -> usize {
    64
}
fn default_self_owned() -> Vec<String> {
    vec!["obmm-self".to_string()]
}
fn default_sim_start_price() -> Decimal {
    Decimal::from(22)
}
fn default_sim_confidence() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_sim_quote_balance() -> Decimal {
    Decimal::from(5_000)
}
fn default_sim_base_balance() -> Decimal {
    Decimal::from(120)
}
