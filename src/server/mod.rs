//! # Server Module
//!
//! Process-level plumbing around the roleplay systems:
//!
//! - [`server`] - store/registry setup, the stdin command loop and shutdown
//! - [`commands`] - text command parsing and execution
//! - [`tasks`] - periodic save and food decay passes
//!
//! ```rust,no_run
//! use rpcore::config::Config;
//! use rpcore::server::RoleplayServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut server = RoleplayServer::new(config).await?;
//!     server.run().await
//! }
//! ```

pub mod commands;
#[allow(clippy::module_inception)]
pub mod server;
pub mod tasks;

pub use commands::{CommandProcessor, RpCommand};
pub use server::RoleplayServer;
pub use tasks::{spawn_roleplay_tasks, PeriodicTask};
