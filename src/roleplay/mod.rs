//! Roleplay gameplay systems: item catalog and use effects, inventories, money, food and
//! water, jobs and vehicles, backed by a Sled store.
//!
//! Registration happens once at startup through [`RegistryBuilder`]; the frozen
//! [`Registry`] is then shared by the [`RoleplayService`], which owns every ledger mutation.

pub mod dispatch;
pub mod documents;
pub mod effects;
pub mod errors;
pub mod food;
pub mod hud;
pub mod inventory;
pub mod jobs;
pub mod locks;
pub mod money;
pub mod registry;
pub mod seed;
pub mod service;
pub mod storage;
pub mod types;
pub mod vehicles;

pub use dispatch::ItemUseOutcome;
pub use documents::CharacterDocuments;
pub use effects::{
    CashEffect, ConsumeOnly, FoodWaterEffect, HealEffect, Touched, UseContext, UseEffect,
};
pub use errors::{RoleplayError, RoleplayResult};
pub use food::FoodDelta;
pub use hud::{HudBridge, HudEvent, HudMessage, HudTarget};
pub use inventory::{format_inventory_compact, InventoryResult};
pub use jobs::JobLabel;
pub use locks::CharacterLocks;
pub use money::format_money;
pub use registry::{RegistrationMode, Registry, RegistryBuilder};
pub use seed::register_defaults;
pub use service::{LockAttempt, RoleplayService};
pub use storage::{RoleplayStore, RoleplayStoreBuilder};
pub use types::*;
pub use vehicles::VehicleOptions;
