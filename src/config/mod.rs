//! # Configuration Management Module
//!
//! This module loads and validates the TOML configuration for the roleplay server.
//! Every section carries defaults, so a partial file (or none at all for `init`) is
//! enough to start.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - Server name and console behaviour
//! - [`StorageConfig`] - Location of the sled database
//! - [`LoggingConfig`] - Log level and optional log file
//! - [`RegistryConfig`] - Strict or lenient handling of duplicate item/job registrations
//! - [`InventoryConfig`] - Default inventory weight capacity
//! - [`FoodConfig`] - Hunger and thirst limits, decay ranges and interval
//! - [`JobsConfig`] - Double-job policy
//! - [`VehiclesConfig`] - Lock range, lock key and vehicle defaults
//! - [`SaveConfig`] - Periodic save intervals
//! - [`CharactersConfig`] - Starting balances and readiness timeout
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rpcore::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Max inventory weight: {}", config.inventory.max_weight);
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [inventory]
//! max_weight = 40
//!
//! [food]
//! use_food = true
//! decrease_interval_ms = 600000
//! food_decrease = { min = 3, max = 7 }
//! water_decrease = { min = 3, max = 7 }
//!
//! [jobs]
//! double_job_allowed = false
//! max_jobs = 2
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub vehicles: VehiclesConfig,
    #[serde(default)]
    pub save: SaveConfig,
    #[serde(default)]
    pub characters: CharactersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    /// Print a `>` prompt on the console before each command
    #[serde(default = "default_true")]
    pub show_prompt: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Roleplay Server".to_string(),
            show_prompt: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data/rpcore".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    /// Reject a second registration of the same item id, item name or job at startup.
    /// When false the later registration wins and a warning is logged.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Weight capacity given to new characters
    pub max_weight: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self { max_weight: 40 }
    }
}

/// Inclusive range for randomized decay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecreaseRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodConfig {
    /// Enables periodic hunger and thirst decay
    pub use_food: bool,
    pub food_decrease: DecreaseRange,
    pub water_decrease: DecreaseRange,
    pub decrease_interval_ms: u64,
    pub max_food: i32,
    pub max_water: i32,
    pub min_food: i32,
    pub min_water: i32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            use_food: true,
            food_decrease: DecreaseRange { min: 3, max: 7 },
            water_decrease: DecreaseRange { min: 3, max: 7 },
            decrease_interval_ms: 600_000,
            max_food: 100,
            max_water: 100,
            min_food: 0,
            min_water: 0,
        }
    }
}

impl FoodConfig {
    pub fn decrease_interval(&self) -> Duration {
        Duration::from_millis(self.decrease_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Allow a character to hold several different jobs at once
    pub double_job_allowed: bool,
    /// Upper bound on held jobs when double jobs are allowed
    pub max_jobs: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            double_job_allowed: false,
            max_jobs: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehiclesConfig {
    /// Maximum distance for the lock keybind
    pub lock_range: f32,
    /// Key code bound to the lock toggle on the client
    pub lock_key: u32,
    /// Push fuel/engine/speed updates to the vehicle HUD
    pub use_vehicle_hud: bool,
    pub default_plate: String,
    pub default_fuel: f32,
}

impl Default for VehiclesConfig {
    fn default() -> Self {
        Self {
            lock_range: 15.0,
            lock_key: 85,
            use_vehicle_hud: true,
            default_plate: "Admin".to_string(),
            default_fuel: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveConfig {
    pub players_interval_ms: u64,
    pub vehicles_interval_ms: u64,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            players_interval_ms: 5_000,
            vehicles_interval_ms: 5_000,
        }
    }
}

impl SaveConfig {
    pub fn players_interval(&self) -> Duration {
        Duration::from_millis(self.players_interval_ms)
    }

    pub fn vehicles_interval(&self) -> Duration {
        Duration::from_millis(self.vehicles_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharactersConfig {
    /// Upper bound on waiting for a character document to become ready
    pub ready_timeout_ms: u64,
    pub starting_cash: i64,
    pub starting_bank: i64,
}

impl Default for CharactersConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 10_000,
            starting_cash: 500,
            starting_bank: 5_000,
        }
    }
}

impl CharactersConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<()> {
        let food = &self.food;
        if food.min_food > food.max_food || food.min_water > food.max_water {
            return Err(anyhow!("food/water minimum exceeds maximum"));
        }
        for (label, range) in [
            ("food_decrease", food.food_decrease),
            ("water_decrease", food.water_decrease),
        ] {
            if range.min < 0 || range.min > range.max {
                return Err(anyhow!(
                    "{} range invalid: min {} max {}",
                    label,
                    range.min,
                    range.max
                ));
            }
        }
        if food.use_food && food.decrease_interval_ms == 0 {
            return Err(anyhow!("food.decrease_interval_ms must be greater than zero"));
        }
        if self.save.players_interval_ms == 0 || self.save.vehicles_interval_ms == 0 {
            return Err(anyhow!("save intervals must be greater than zero"));
        }
        if self.jobs.max_jobs == 0 {
            return Err(anyhow!("jobs.max_jobs must be at least 1"));
        }
        if self.vehicles.lock_range <= 0.0 {
            return Err(anyhow!("vehicles.lock_range must be positive"));
        }
        Ok(())
    }
}
