//! # rpcore - Roleplay Gameplay Systems
//!
//! rpcore provides the server-side gameplay ledgers of a roleplay game server: what each
//! character owns, earns, eats and drives, and what happens when an item is used.
//!
//! ## Features
//!
//! - **Item Registry**: Catalog of item definitions plus use effects keyed by item name, frozen after startup.
//! - **Item Use Dispatch**: Effects run against a working copy; failures and panics leave every ledger untouched.
//! - **Inventories**: Stacking entries with a per-character weight cap.
//! - **Money**: Cash, bank and black money accounts with overdraft protection.
//! - **Food & Water**: Clamped values, periodic randomized decay.
//! - **Jobs**: Graded jobs with optional double-job mode.
//! - **Vehicles**: Owned vehicles with keys, lock toggling by proximity, repair and periodic saves.
//! - **HUD Bridge**: Typed UI events pushed over a channel after every committed change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rpcore::config::Config;
//! use rpcore::server::RoleplayServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut server = RoleplayServer::new(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`roleplay`] - Domain types, registry, ledgers, dispatch and the sled store
//! - [`server`] - Server lifecycle, text commands and periodic tasks
//! - [`config`] - Configuration management and validation
//! - [`validation`] - Command argument parsing and name validation
//! - [`metrics`] - Process-wide counters
//! - [`logutil`] - Log line sanitizing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Server /       │ ← Commands, periodic passes
//! │  Commands       │
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ RoleplayService │ ← Locks, working copies, HUD events
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  RoleplayStore  │ ← Sled persistence
//! └─────────────────┘
//! ```

pub mod config;
pub mod logutil;
pub mod metrics;
pub mod roleplay;
pub mod server;
pub mod validation;
