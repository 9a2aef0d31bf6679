//! Item use effects.
//!
//! Every usable item kind is backed by a [`UseEffect`] implementation registered under the
//! item's display name. The dispatcher hands an effect a [`UseContext`] holding a working
//! copy of the character; the copy is committed only when the effect returns `Ok`.
//!
//! Effects are responsible for consuming the used units themselves (usually via
//! [`UseContext::consume_used`]); nothing is decremented automatically.

use super::errors::RoleplayResult;
use super::food::{self, FoodDelta};
use super::inventory;
use super::money;
use super::types::{Account, Actor, CharacterRecord, InventoryEntry, MAX_HEALTH};
use crate::config::FoodConfig;

/// Ledgers an effect touched, so the caller knows which HUD updates to push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Touched {
    pub money: bool,
    pub food: bool,
    pub inventory: bool,
    pub health: bool,
}

/// Everything an effect may read or change during one use.
pub struct UseContext<'a> {
    actor: &'a Actor,
    entry: InventoryEntry,
    quantity: u32,
    character: &'a mut CharacterRecord,
    food_config: &'a FoodConfig,
    touched: Touched,
    notices: Vec<String>,
}

impl<'a> UseContext<'a> {
    pub fn new(
        actor: &'a Actor,
        entry: InventoryEntry,
        quantity: u32,
        character: &'a mut CharacterRecord,
        food_config: &'a FoodConfig,
    ) -> Self {
        Self {
            actor,
            entry,
            quantity,
            character,
            food_config,
            touched: Touched::default(),
            notices: Vec::new(),
        }
    }

    pub fn actor(&self) -> &Actor {
        self.actor
    }

    pub fn character_id(&self) -> &str {
        &self.character.id
    }

    pub fn character(&self) -> &CharacterRecord {
        self.character
    }

    /// The inventory entry as it was when the use was requested.
    pub fn entry(&self) -> &InventoryEntry {
        &self.entry
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Remove `quantity` units of any item from the working inventory.
    pub fn consume(&mut self, item_id: &str, quantity: u32) -> RoleplayResult<()> {
        inventory::remove_item(self.character, item_id, quantity)?;
        self.touched.inventory = true;
        Ok(())
    }

    /// Remove the units being used.
    pub fn consume_used(&mut self) -> RoleplayResult<()> {
        let id = self.entry.id.clone();
        self.consume(&id, self.quantity)
    }

    /// Raise health, capped at the maximum. Returns the new value.
    pub fn heal(&mut self, amount: u32) -> u32 {
        self.character.health = self.character.health.saturating_add(amount).min(MAX_HEALTH);
        self.touched.health = true;
        self.character.health
    }

    pub fn add_money(&mut self, account: Account, amount: i64) -> RoleplayResult<i64> {
        let balance = money::deposit(self.character, account, amount)?;
        self.touched.money = true;
        Ok(balance)
    }

    pub fn remove_money(&mut self, account: Account, amount: i64) -> RoleplayResult<i64> {
        let balance = money::withdraw(self.character, account, amount)?;
        self.touched.money = true;
        Ok(balance)
    }

    pub fn add_food_and_water(&mut self, food: FoodDelta, water: FoodDelta) -> (i32, i32) {
        let values = food::add_food_and_water(self.character, food, water, self.food_config);
        self.touched.food = true;
        values
    }

    /// Queue a notification for the acting player.
    pub fn notify(&mut self, text: impl Into<String>) {
        self.notices.push(text.into());
    }

    pub fn touched(&self) -> Touched {
        self.touched
    }

    pub fn into_notices(self) -> Vec<String> {
        self.notices
    }
}

/// Behaviour of an item when a player uses it.
pub trait UseEffect: Send + Sync {
    /// Short description for item listings.
    fn describe(&self) -> String;

    fn apply(&self, ctx: &mut UseContext<'_>) -> RoleplayResult<()>;
}

// ============================================================================
// Built-in effects
// ============================================================================

/// Restores health, optionally per used unit.
#[derive(Debug, Clone, Copy)]
pub struct HealEffect {
    pub amount: u32,
    pub per_unit: bool,
}

impl UseEffect for HealEffect {
    fn describe(&self) -> String {
        if self.per_unit {
            format!("heals {} per unit", self.amount)
        } else {
            format!("heals {}", self.amount)
        }
    }

    fn apply(&self, ctx: &mut UseContext<'_>) -> RoleplayResult<()> {
        let amount = if self.per_unit {
            self.amount.saturating_mul(ctx.quantity())
        } else {
            self.amount
        };
        ctx.consume_used()?;
        let health = ctx.heal(amount);
        let name = ctx.entry().name.clone();
        ctx.notify(format!("Used {}: healed {} (health {}).", name, amount, health));
        Ok(())
    }
}

/// Pays a fixed amount into an account.
#[derive(Debug, Clone, Copy)]
pub struct CashEffect {
    pub account: Account,
    pub amount: i64,
}

impl UseEffect for CashEffect {
    fn describe(&self) -> String {
        format!("pays {} into {}", money::format_money(self.amount), self.account)
    }

    fn apply(&self, ctx: &mut UseContext<'_>) -> RoleplayResult<()> {
        ctx.consume_used()?;
        ctx.add_money(self.account, self.amount)?;
        ctx.notify(format!(
            "You received {} ({}).",
            money::format_money(self.amount),
            self.account
        ));
        Ok(())
    }
}

/// Restores food and water per used unit.
#[derive(Debug, Clone, Copy)]
pub struct FoodWaterEffect {
    pub food_per_unit: i32,
    pub water_per_unit: i32,
}

impl UseEffect for FoodWaterEffect {
    fn describe(&self) -> String {
        format!(
            "restores {} food and {} water per unit",
            self.food_per_unit, self.water_per_unit
        )
    }

    fn apply(&self, ctx: &mut UseContext<'_>) -> RoleplayResult<()> {
        let quantity = ctx.quantity();
        let units = i32::try_from(quantity).unwrap_or(i32::MAX);
        ctx.consume_used()?;
        let (food, water) = ctx.add_food_and_water(
            FoodDelta::By(self.food_per_unit.saturating_mul(units)),
            FoodDelta::By(self.water_per_unit.saturating_mul(units)),
        );
        let name = ctx.entry().name.clone();
        ctx.notify(format!(
            "Consumed {}x {} (food {}, water {}).",
            quantity,
            name,
            food,
            water
        ));
        Ok(())
    }
}

/// Consumes the item with no further effect.
#[derive(Debug, Clone, Copy)]
pub struct ConsumeOnly;

impl UseEffect for ConsumeOnly {
    fn describe(&self) -> String {
        "consumed on use".to_string()
    }

    fn apply(&self, ctx: &mut UseContext<'_>) -> RoleplayResult<()> {
        ctx.consume_used()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roleplay::types::ItemDefinition;

    fn character_with(item: &ItemDefinition, quantity: u32) -> CharacterRecord {
        let mut record = CharacterRecord::new("char-1", "John Doe", 40);
        inventory::add_item(&mut record, item, quantity).expect("add");
        record
    }

    #[test]
    fn heal_caps_at_max_health() {
        let kit = ItemDefinition::new("item_health_kit", "Health_Kit", "consumable", 5);
        let mut record = character_with(&kit, 2);
        record.health = 30;
        let actor = Actor::console();
        let config = FoodConfig::default();
        let entry = record.inventory[0].clone();
        let mut ctx = UseContext::new(&actor, entry, 2, &mut record, &config);
        HealEffect {
            amount: 50,
            per_unit: true,
        }
        .apply(&mut ctx)
        .expect("apply");
        assert!(ctx.touched().health && ctx.touched().inventory);
        assert_eq!(ctx.into_notices().len(), 1);
        assert_eq!(record.health, 100);
        assert!(record.inventory.is_empty());
    }

    #[test]
    fn cash_effect_fails_when_nothing_to_consume() {
        let bag = ItemDefinition::new("moneybag", "Geldsack", "consumable", 3);
        let mut record = character_with(&bag, 1);
        let actor = Actor::console();
        let config = FoodConfig::default();
        let entry = record.inventory[0].clone();
        let mut ctx = UseContext::new(&actor, entry, 2, &mut record, &config);
        let effect = CashEffect {
            account: Account::Cash,
            amount: 100,
        };
        assert!(effect.apply(&mut ctx).is_err());
        assert!(!ctx.touched().money);
    }

    #[test]
    fn food_effect_scales_with_quantity() {
        let apple = ItemDefinition::new("item_apple", "Apple", "consumable", 1);
        let mut record = character_with(&apple, 3);
        record.food = 10;
        record.water = 95;
        let actor = Actor::console();
        let config = FoodConfig::default();
        let entry = record.inventory[0].clone();
        let mut ctx = UseContext::new(&actor, entry, 2, &mut record, &config);
        FoodWaterEffect {
            food_per_unit: 15,
            water_per_unit: 15,
        }
        .apply(&mut ctx)
        .expect("apply");
        assert_eq!(record.food, 40);
        assert_eq!(record.water, 100);
        assert_eq!(record.inventory[0].quantity, 1);
    }

    #[test]
    fn food_effect_saturates_huge_quantities() {
        let apple = ItemDefinition::new("item_apple", "Apple", "consumable", 1);
        let mut record = CharacterRecord::new("char-1", "John Doe", u32::MAX);
        inventory::add_item(&mut record, &apple, 3_000_000_000).expect("add");
        record.food = 50;
        record.water = 50;
        let actor = Actor::console();
        let config = FoodConfig::default();
        let entry = record.inventory[0].clone();
        let mut ctx = UseContext::new(&actor, entry, 3_000_000_000, &mut record, &config);
        FoodWaterEffect {
            food_per_unit: 15,
            water_per_unit: 15,
        }
        .apply(&mut ctx)
        .expect("apply");
        let notices = ctx.into_notices();
        assert_eq!(
            notices,
            vec!["Consumed 3000000000x Apple (food 100, water 100).".to_string()]
        );
        assert_eq!((record.food, record.water), (100, 100));
        assert!(record.inventory.is_empty());
    }
}
