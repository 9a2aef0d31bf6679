//! Ledger services over characters and vehicles.
//!
//! [`RoleplayService`] is the public API consumed by commands and item effects. Every
//! character mutation follows the same path:
//!
//! 1. take the character's lock ([`CharacterLocks`]),
//! 2. load a working copy (bound document first, then the store),
//! 3. apply the change to the copy,
//! 4. persist the copy, then replace the in-memory document,
//! 5. push the new values to the HUD.
//!
//! A failed write leaves both the store and the document as they were.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, error, info, warn};
use uuid::Uuid;

use super::documents::CharacterDocuments;
use super::errors::{RoleplayError, RoleplayResult};
use super::food::{self, FoodDelta};
use super::hud::{HudBridge, HudEvent};
use super::inventory::{self, InventoryResult};
use super::jobs::{self, JobLabel};
use super::locks::CharacterLocks;
use super::money;
use super::registry::Registry;
use super::storage::RoleplayStore;
use super::types::{
    Account, Actor, CharacterRecord, InventoryEntry, JobAssignment, Vec3, VehicleRecord,
    VehicleStatus,
};
use super::vehicles::{self, VehicleOptions};
use crate::config::Config;
use crate::logutil::{actor_tag, escape_log};
use crate::metrics;
use crate::validation::validate_character_name;

/// Result of the lock keybind.
#[derive(Debug, Clone, PartialEq)]
pub enum LockAttempt {
    Toggled {
        vehicle_id: String,
        model: String,
        locked: bool,
    },
    NoneNearby,
    OutOfRange {
        vehicle_id: String,
        distance: f32,
    },
    NoKey {
        vehicle_id: String,
    },
}

pub struct RoleplayService {
    pub(super) config: Config,
    pub(super) registry: Arc<Registry>,
    pub(super) store: Arc<RoleplayStore>,
    pub(super) documents: CharacterDocuments,
    pub(super) locks: CharacterLocks,
    vehicles: RwLock<HashMap<String, VehicleRecord>>,
    pub(super) hud: HudBridge,
}

impl RoleplayService {
    pub fn new(
        config: Config,
        registry: Arc<Registry>,
        store: Arc<RoleplayStore>,
        hud: HudBridge,
    ) -> Self {
        Self {
            config,
            registry,
            store,
            documents: CharacterDocuments::new(),
            locks: CharacterLocks::new(),
            vehicles: RwLock::new(HashMap::new()),
            hud,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &RoleplayStore {
        &self.store
    }

    pub fn documents(&self) -> &CharacterDocuments {
        &self.documents
    }

    pub fn hud(&self) -> &HudBridge {
        &self.hud
    }

    // ========================================================================
    // Persistence path
    // ========================================================================

    pub(super) fn load(&self, character_id: &str) -> RoleplayResult<CharacterRecord> {
        if let Some(record) = self.documents.get(character_id) {
            return Ok(record);
        }
        self.store.get_character(character_id)
    }

    pub(super) fn commit(&self, mut record: CharacterRecord) -> RoleplayResult<CharacterRecord> {
        record.touch();
        if let Err(e) = self.store.put_character(record.clone()) {
            metrics::inc_persist_failure();
            error!("failed to persist character {}: {}", record.id, e);
            return Err(e);
        }
        self.documents.replace(&record);
        Ok(record)
    }

    async fn mutate<T>(
        &self,
        character_id: &str,
        op: impl FnOnce(&mut CharacterRecord) -> RoleplayResult<T>,
    ) -> RoleplayResult<(T, CharacterRecord)> {
        let _guard = self.locks.lock(character_id).await;
        let mut working = self.load(character_id)?;
        let out = op(&mut working)?;
        let committed = self.commit(working)?;
        Ok((out, committed))
    }

    // ========================================================================
    // HUD
    // ========================================================================

    pub(super) fn emit_money(&self, record: &CharacterRecord) {
        self.hud
            .emit_character(&record.id, HudEvent::Money(record.balances()));
        self.emit_status(record);
    }

    pub(super) fn emit_status(&self, record: &CharacterRecord) {
        let label = self.job_label_for(record);
        self.hud.emit_character(
            &record.id,
            HudEvent::Status {
                cash: record.cash,
                bank: record.bank,
                black_money: record.black_money,
                job_name: label.job_name,
                job_grade: label.grade_name,
            },
        );
    }

    pub(super) fn emit_food(&self, record: &CharacterRecord) {
        self.hud.emit_character(
            &record.id,
            HudEvent::Food {
                food: record.food,
                water: record.water,
            },
        );
    }

    pub(super) fn emit_inventory(&self, record: &CharacterRecord) {
        self.hud.emit_character(
            &record.id,
            HudEvent::Inventory {
                inventory: record.inventory.clone(),
                max_weight: record.max_weight,
            },
        );
    }

    pub(super) fn emit_vitals(&self, record: &CharacterRecord) {
        self.hud.emit_character(
            &record.id,
            HudEvent::Vitals {
                health: record.health,
                armor: record.armor,
            },
        );
    }

    fn job_label_for(&self, record: &CharacterRecord) -> JobLabel {
        jobs::job_label(record, |name| self.registry.job(name))
    }

    // ========================================================================
    // Characters
    // ========================================================================

    /// Create and persist a new character with the configured starting balances.
    pub fn create_character(&self, name: &str) -> RoleplayResult<CharacterRecord> {
        let name = validate_character_name(name)
            .map_err(|e| RoleplayError::InvalidArgument(e.to_string()))?;
        let name = name.as_str();
        if self.store.find_character_id_by_name(name)?.is_some() {
            return Err(RoleplayError::InvalidArgument(format!(
                "character name '{}' is taken",
                name
            )));
        }
        let mut record = CharacterRecord::new(
            &Uuid::new_v4().to_string(),
            name,
            self.config.inventory.max_weight,
        );
        record.cash = self.config.characters.starting_cash;
        record.bank = self.config.characters.starting_bank;
        self.store.put_character(record.clone())?;
        info!("created character {} ({})", escape_log(name), record.id);
        Ok(record)
    }

    /// Accept either a character id or a (case-insensitive) display name.
    pub fn resolve_character_id(&self, key: &str) -> RoleplayResult<String> {
        if self.documents.is_bound(key) || self.store.character_exists(key)? {
            return Ok(key.to_string());
        }
        self.store
            .find_character_id_by_name(key)?
            .ok_or_else(|| RoleplayError::character_not_found(key))
    }

    pub fn does_character_exist(&self, character_id: &str) -> RoleplayResult<bool> {
        Ok(self.documents.is_bound(character_id) || self.store.character_exists(character_id)?)
    }

    pub fn get_character_data(&self, character_id: &str) -> RoleplayResult<CharacterRecord> {
        self.load(character_id)
    }

    /// Bind a character to a connected player and push the full HUD.
    pub async fn connect_character(
        &self,
        actor: &Actor,
        character_id: &str,
    ) -> RoleplayResult<CharacterRecord> {
        let _guard = self.locks.lock(character_id).await;
        let record = self.store.get_character(character_id)?;
        if let Some(previous) = self.documents.actor_for(character_id) {
            warn!(
                "character {} rebound from player {} to {}",
                character_id, previous.id, actor.id
            );
        }
        self.documents.bind(actor.clone(), record.clone());
        info!("{} is now playing {}", actor_tag(actor), escape_log(&record.name));
        self.emit_money(&record);
        self.emit_food(&record);
        self.emit_inventory(&record);
        Ok(record)
    }

    /// Persist and release a played character.
    pub async fn disconnect_character(&self, character_id: &str) -> RoleplayResult<bool> {
        let _guard = self.locks.lock(character_id).await;
        let Some(record) = self.documents.get(character_id) else {
            return Ok(false);
        };
        self.store.put_character(record)?;
        self.documents.unbind(character_id);
        drop(_guard);
        self.locks.prune();
        info!("character {} disconnected", character_id);
        Ok(true)
    }

    /// Wait (bounded by `characters.ready_timeout_ms`) for a character to be bound.
    pub async fn wait_for_character(&self, character_id: &str) -> RoleplayResult<CharacterRecord> {
        self.documents
            .wait_ready(character_id, self.config.characters.ready_timeout())
            .await
    }

    /// Host-reported health, armor and position; persisted by the next save pass.
    /// Serialized with ledger mutations on the same character.
    pub async fn update_actor_state(
        &self,
        character_id: &str,
        health: u32,
        armor: u32,
        position: Vec3,
    ) -> bool {
        let _guard = self.locks.lock(character_id).await;
        self.documents
            .update_state(character_id, health, armor, position)
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    /// Reset the character to an empty inventory.
    pub async fn create_inventory(&self, character_id: &str) -> RoleplayResult<()> {
        let (_, record) = self
            .mutate(character_id, |c| {
                c.inventory.clear();
                Ok(())
            })
            .await?;
        self.emit_inventory(&record);
        Ok(())
    }

    pub async fn add_inventory_item(
        &self,
        character_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> RoleplayResult<InventoryResult> {
        let definition = self
            .registry
            .item(item_id)
            .cloned()
            .ok_or_else(|| RoleplayError::NotFound(format!("item {}", item_id)))?;
        let (result, record) = self
            .mutate(character_id, |c| inventory::add_item(c, &definition, quantity))
            .await?;
        info!("added {}x {} to {}", quantity, item_id, character_id);
        self.emit_inventory(&record);
        Ok(result)
    }

    /// Returns false, changing nothing, when fewer than `quantity` units are held.
    pub async fn remove_inventory_item(
        &self,
        character_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> RoleplayResult<bool> {
        match self
            .mutate(character_id, |c| inventory::remove_item(c, item_id, quantity))
            .await
        {
            Ok((_, record)) => {
                info!("removed {}x {} from {}", quantity, item_id, character_id);
                self.emit_inventory(&record);
                Ok(true)
            }
            Err(RoleplayError::ItemNotInInventory(_))
            | Err(RoleplayError::InsufficientQuantity { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn get_inventory_items(&self, character_id: &str) -> RoleplayResult<Vec<InventoryEntry>> {
        Ok(self.load(character_id)?.inventory)
    }

    pub fn has_item(&self, character_id: &str, item_id: &str, quantity: u32) -> RoleplayResult<bool> {
        Ok(inventory::has_item(&self.load(character_id)?, item_id, quantity))
    }

    pub async fn set_max_weight(&self, character_id: &str, max_weight: u32) -> RoleplayResult<()> {
        let (_, record) = self
            .mutate(character_id, |c| {
                c.max_weight = max_weight;
                Ok(())
            })
            .await?;
        if inventory::total_weight(&record.inventory) > max_weight as u64 {
            warn!(
                "{} now carries more than the new cap of {}",
                character_id, max_weight
            );
        }
        self.emit_inventory(&record);
        Ok(())
    }

    /// Move units from one character to another. Both sides change or neither does.
    pub async fn give_item(
        &self,
        from: &str,
        to: &str,
        item_id: &str,
        quantity: u32,
    ) -> RoleplayResult<()> {
        if from == to {
            return Err(RoleplayError::InvalidArgument(
                "cannot give an item to yourself".to_string(),
            ));
        }
        let definition = self
            .registry
            .item(item_id)
            .cloned()
            .ok_or_else(|| RoleplayError::NotFound(format!("item {}", item_id)))?;

        let (_first, _second) = self.locks.lock_pair(from, to).await;
        let mut giver = self.load(from)?;
        let mut receiver = self.load(to)?;
        inventory::remove_item(&mut giver, item_id, quantity)?;
        inventory::add_item(&mut receiver, &definition, quantity)?;
        giver.touch();
        receiver.touch();

        if let Err(e) = self.store.put_characters(&[giver.clone(), receiver.clone()]) {
            metrics::inc_persist_failure();
            error!("failed to persist transfer {} -> {}: {}", from, to, e);
            return Err(e);
        }
        self.documents.replace(&giver);
        self.documents.replace(&receiver);
        info!("{} gave {}x {} to {}", from, quantity, item_id, to);
        self.emit_inventory(&giver);
        self.emit_inventory(&receiver);
        Ok(())
    }

    /// Discard units from the inventory.
    pub async fn drop_item(&self, character_id: &str, item_id: &str, quantity: u32) -> RoleplayResult<()> {
        let (_, record) = self
            .mutate(character_id, |c| inventory::remove_item(c, item_id, quantity))
            .await?;
        info!("{} dropped {}x {}", character_id, quantity, item_id);
        self.emit_inventory(&record);
        Ok(())
    }

    // ========================================================================
    // Money
    // ========================================================================

    pub async fn add_money(&self, character_id: &str, amount: i64, account: Account) -> RoleplayResult<i64> {
        let (balance, record) = self
            .mutate(character_id, |c| money::deposit(c, account, amount))
            .await?;
        info!("{} +{} {} (now {})", character_id, amount, account, balance);
        self.emit_money(&record);
        Ok(balance)
    }

    /// Fails with `InsufficientFunds`, balance unchanged, when the account holds less.
    pub async fn remove_money(&self, character_id: &str, amount: i64, account: Account) -> RoleplayResult<i64> {
        let (balance, record) = self
            .mutate(character_id, |c| money::withdraw(c, account, amount))
            .await?;
        info!("{} -{} {} (now {})", character_id, amount, account, balance);
        self.emit_money(&record);
        Ok(balance)
    }

    pub fn get_money(&self, character_id: &str, account: Account) -> RoleplayResult<i64> {
        Ok(self.load(character_id)?.balance(account))
    }

    pub fn has_character_enough(
        &self,
        character_id: &str,
        amount: i64,
        account: Account,
    ) -> RoleplayResult<bool> {
        Ok(money::has_enough(&self.load(character_id)?, account, amount))
    }

    // ========================================================================
    // Food / water
    // ========================================================================

    pub async fn add_food_and_water(
        &self,
        character_id: &str,
        food_delta: FoodDelta,
        water_delta: FoodDelta,
    ) -> RoleplayResult<(i32, i32)> {
        let food_config = &self.config.food;
        let (values, record) = self
            .mutate(character_id, |c| {
                Ok(food::add_food_and_water(c, food_delta, water_delta, food_config))
            })
            .await?;
        debug!(
            "{} food/water {:?}/{:?} -> {:?}",
            character_id, food_delta, water_delta, values
        );
        self.emit_food(&record);
        Ok(values)
    }

    /// Apply one randomized decay step.
    pub async fn remove_food_and_water(&self, character_id: &str) -> RoleplayResult<(i32, i32)> {
        let food_config = &self.config.food;
        let (values, record) = self
            .mutate(character_id, |c| {
                let mut rng = rand::thread_rng();
                Ok(food::decay(c, food_config, &mut rng))
            })
            .await?;
        self.emit_food(&record);
        Ok(values)
    }

    pub fn get_character_food_and_water(&self, character_id: &str) -> RoleplayResult<(i32, i32)> {
        let record = self.load(character_id)?;
        Ok((record.food, record.water))
    }

    /// Decay step for every played character. Returns how many were updated.
    pub async fn decay_online_characters(&self) -> usize {
        if !self.config.food.use_food {
            return 0;
        }
        let mut updated = 0;
        for id in self.documents.online_ids() {
            match self.remove_food_and_water(&id).await {
                Ok(_) => updated += 1,
                Err(e) => warn!("food decay failed for {}: {}", id, e),
            }
        }
        updated
    }

    // ========================================================================
    // Jobs
    // ========================================================================

    pub async fn assign_job(
        &self,
        actor: &Actor,
        character_id: &str,
        job_name: &str,
        grade: u32,
    ) -> RoleplayResult<()> {
        let definition = self
            .registry
            .job(job_name)
            .cloned()
            .ok_or_else(|| RoleplayError::NotFound(format!("job {}", job_name)))?;
        let jobs_config = &self.config.jobs;
        let (_, record) = self
            .mutate(character_id, |c| {
                jobs::assign_job(c, &definition, grade, jobs_config)
            })
            .await?;
        info!(
            "{} assigned {} grade {} to {}",
            actor_tag(actor),
            job_name,
            grade,
            character_id
        );
        self.emit_status(&record);
        Ok(())
    }

    /// Returns false when the character did not hold the job.
    pub async fn remove_job(&self, actor: &Actor, character_id: &str, job_name: &str) -> RoleplayResult<bool> {
        let (removed, record) = self
            .mutate(character_id, |c| Ok(jobs::remove_job(c, job_name)))
            .await?;
        if removed {
            info!(
                "{} removed job {} from {}",
                actor_tag(actor),
                job_name,
                character_id
            );
            self.emit_status(&record);
        }
        Ok(removed)
    }

    pub fn get_character_job(&self, character_id: &str) -> RoleplayResult<Option<JobAssignment>> {
        Ok(jobs::primary_job(&self.load(character_id)?).cloned())
    }

    pub fn does_character_have_job(&self, character_id: &str, job_name: &str) -> RoleplayResult<bool> {
        Ok(jobs::has_job(&self.load(character_id)?, job_name))
    }

    pub fn does_character_have_job_grade(
        &self,
        character_id: &str,
        job_name: &str,
        grade: u32,
    ) -> RoleplayResult<bool> {
        Ok(jobs::has_job_grade(&self.load(character_id)?, job_name, grade))
    }

    pub fn get_job_data(&self, character_id: &str) -> RoleplayResult<JobLabel> {
        Ok(self.job_label_for(&self.load(character_id)?))
    }

    // ========================================================================
    // Vehicles
    // ========================================================================

    fn with_vehicle<T>(&self, vehicle_id: &str, op: impl FnOnce(&mut VehicleRecord) -> T) -> Option<T> {
        let mut table = self.vehicles.write().unwrap_or_else(PoisonError::into_inner);
        table.get_mut(vehicle_id).map(op)
    }

    /// Create, persist and spawn a vehicle. Returns its id.
    pub fn create_vehicle(
        &self,
        owner: &str,
        model: &str,
        pos: Vec3,
        rot: Vec3,
        options: VehicleOptions,
    ) -> RoleplayResult<String> {
        if model.trim().is_empty() {
            return Err(RoleplayError::InvalidArgument(
                "vehicle model must not be empty".to_string(),
            ));
        }
        if !self.does_character_exist(owner)? {
            return Err(RoleplayError::character_not_found(owner));
        }
        let vehicle = vehicles::build_vehicle(owner, model, pos, rot, options, &self.config.vehicles);
        let id = vehicle.id.clone();
        self.store.put_vehicle(vehicle.clone())?;
        self.vehicles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), vehicle);
        info!("vehicle created: {} model {} for {}", id, escape_log(model), owner);
        Ok(id)
    }

    pub fn get_vehicle_by_id(&self, vehicle_id: &str) -> Option<VehicleRecord> {
        self.vehicles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(vehicle_id)
            .cloned()
    }

    pub fn list_spawned_vehicles(&self) -> Vec<VehicleRecord> {
        let table = self.vehicles.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<VehicleRecord> = table.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        all
    }

    /// Despawn and delete. Returns false when no such vehicle is spawned.
    pub fn delete_vehicle(&self, vehicle_id: &str) -> RoleplayResult<bool> {
        // The store delete happens under the table lock so a save pass
        // cannot write the row back after it is gone.
        let mut table = self.vehicles.write().unwrap_or_else(PoisonError::into_inner);
        if table.remove(vehicle_id).is_none() {
            warn!("vehicle {} not found", escape_log(vehicle_id));
            return Ok(false);
        }
        self.store.delete_vehicle(vehicle_id)?;
        drop(table);
        info!("vehicle removed: {}", vehicle_id);
        Ok(true)
    }

    /// Returns `Some(true)` when the vehicle is now locked, `None` when it is not spawned.
    pub fn toggle_vehicle_lock(&self, vehicle_id: &str) -> Option<bool> {
        let locked = self.with_vehicle(vehicle_id, vehicles::toggle_lock);
        if let Some(locked) = locked {
            info!(
                "vehicle {} {}",
                vehicle_id,
                if locked { "locked" } else { "unlocked" }
            );
        }
        locked
    }

    /// Lock keybind: toggle the nearest vehicle within range that the character holds a key for.
    pub fn toggle_nearest_vehicle_lock(&self, actor: &Actor, character_id: &str) -> RoleplayResult<LockAttempt> {
        let character = self.load(character_id)?;
        let range = self.config.vehicles.lock_range;
        let attempt = {
            let mut table = self.vehicles.write().unwrap_or_else(PoisonError::into_inner);
            let nearest = vehicles::nearest(table.values(), &character.position, character.dimension)
                .map(|(v, d)| (v.id.clone(), d));
            match nearest {
                None => LockAttempt::NoneNearby,
                Some((vehicle_id, distance)) if distance > range => {
                    LockAttempt::OutOfRange { vehicle_id, distance }
                }
                Some((vehicle_id, _)) => match table.get_mut(&vehicle_id) {
                    Some(vehicle)
                        if vehicle.owner == character_id
                            || vehicle.keys.iter().any(|k| k == character_id) =>
                    {
                        let locked = vehicles::toggle_lock(vehicle);
                        LockAttempt::Toggled {
                            vehicle_id,
                            model: vehicle.model.clone(),
                            locked,
                        }
                    }
                    _ => LockAttempt::NoKey { vehicle_id },
                },
            }
        };

        let text = match &attempt {
            LockAttempt::Toggled { model, locked, .. } => format!(
                "Vehicle {} {}.",
                model,
                if *locked { "locked" } else { "unlocked" }
            ),
            LockAttempt::NoneNearby => "No vehicle nearby.".to_string(),
            LockAttempt::OutOfRange { vehicle_id, distance } => format!(
                "Vehicle {} is out of lock range ({:.1}m > {:.1}m).",
                vehicle_id, distance, range
            ),
            LockAttempt::NoKey { vehicle_id } => {
                format!("You have no key for vehicle {}.", vehicle_id)
            }
        };
        self.hud.notify(actor, text);
        Ok(attempt)
    }

    pub fn repair_vehicle(&self, vehicle_id: &str) -> bool {
        let repaired = self.with_vehicle(vehicle_id, vehicles::repair).is_some();
        if repaired {
            info!("vehicle {} repaired", vehicle_id);
        }
        repaired
    }

    pub fn update_vehicle_position(&self, vehicle_id: &str, position: Vec3) -> bool {
        self.with_vehicle(vehicle_id, |v| {
            v.pos = position;
            v.touch();
        })
        .is_some()
    }

    pub fn get_vehicle_status(&self, vehicle_id: &str) -> Option<VehicleStatus> {
        self.vehicles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(vehicle_id)
            .map(VehicleStatus::from)
    }

    /// Client-reported engine/speed for the vehicle a character sits in.
    pub fn report_vehicle_state(
        &self,
        character_id: &str,
        vehicle_id: &str,
        engine_on: bool,
        speed: f32,
    ) -> bool {
        let Some((fuel, locked)) = self.with_vehicle(vehicle_id, |v| {
            v.state.engine_on = engine_on;
            (v.fuel, v.is_locked())
        }) else {
            return false;
        };
        if self.config.vehicles.use_vehicle_hud {
            self.hud.emit_character(
                character_id,
                HudEvent::Vehicle {
                    fuel,
                    engine_on,
                    speed,
                    locked,
                },
            );
        }
        true
    }

    /// Spawn every stored vehicle. Returns how many were loaded.
    pub fn load_vehicles(&self) -> RoleplayResult<usize> {
        let stored = self.store.list_vehicles()?;
        let count = stored.len();
        let mut table = self.vehicles.write().unwrap_or_else(PoisonError::into_inner);
        for mut vehicle in stored {
            vehicles::apply_load_defaults(&mut vehicle, &self.config.vehicles);
            table.insert(vehicle.id.clone(), vehicle);
        }
        info!("spawned {} stored vehicles", count);
        Ok(count)
    }

    // ========================================================================
    // Save passes
    // ========================================================================

    /// Write every played character's document to the store.
    pub async fn save_all_players(&self) -> usize {
        let mut saved = 0;
        for id in self.documents.online_ids() {
            let _guard = self.locks.lock(&id).await;
            let Some(record) = self.documents.get(&id) else {
                continue;
            };
            match self.store.put_character(record) {
                Ok(()) => saved += 1,
                Err(e) => {
                    metrics::inc_persist_failure();
                    error!("failed to save character {}: {}", id, e);
                }
            }
        }
        metrics::add_records_saved(saved as u64);
        saved
    }

    /// Write every spawned vehicle to the store.
    pub fn save_all_vehicles(&self) -> usize {
        let mut saved = 0;
        for id in self.list_spawned_vehicles().into_iter().map(|v| v.id) {
            let table = self.vehicles.read().unwrap_or_else(PoisonError::into_inner);
            // Deleted since the snapshot.
            let Some(vehicle) = table.get(&id).cloned() else {
                continue;
            };
            let result = self.store.put_vehicle(vehicle);
            drop(table);
            match result {
                Ok(()) => saved += 1,
                Err(e) => {
                    metrics::inc_persist_failure();
                    error!("failed to save vehicle {}: {}", id, e);
                }
            }
        }
        metrics::add_records_saved(saved as u64);
        saved
    }
}
