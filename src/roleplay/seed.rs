//! Built-in items and jobs registered at startup.

use super::effects::{CashEffect, FoodWaterEffect, HealEffect};
use super::errors::RoleplayResult;
use super::registry::RegistryBuilder;
use super::types::{Account, ItemDefinition, JobDefinition};

pub fn register_default_items(builder: &mut RegistryBuilder) -> RoleplayResult<()> {
    builder.register_item_use(
        ItemDefinition::new("item_health_kit", "Health_Kit", "consumable", 5)
            .with_description("Restores 50 health per kit."),
        HealEffect {
            amount: 50,
            per_unit: true,
        },
    )?;
    builder.register_item_use(
        ItemDefinition::new("moneybag", "Geldsack", "consumable", 3)
            .with_description("A sack of banknotes."),
        CashEffect {
            account: Account::Cash,
            amount: 100,
        },
    )?;
    builder.register_item_use(
        ItemDefinition::new("item_apple", "Apple", "consumable", 1),
        FoodWaterEffect {
            food_per_unit: 15,
            water_per_unit: 15,
        },
    )?;
    builder.register_item_use(
        ItemDefinition::new("item_water", "Wasser", "consumable", 1),
        FoodWaterEffect {
            food_per_unit: 0,
            water_per_unit: 15,
        },
    )?;
    builder.register_item_use(
        ItemDefinition::new("item_bread", "Brot", "consumable", 2),
        HealEffect {
            amount: 20,
            per_unit: false,
        },
    )?;
    Ok(())
}

pub fn register_default_jobs(builder: &mut RegistryBuilder) -> RoleplayResult<()> {
    builder.register_job(JobDefinition::new(
        "police",
        &[
            ("Cadet", 1),
            ("Officer", 2),
            ("Sergeant", 3),
            ("Lieutenant", 4),
            ("Captain", 5),
        ],
    ))?;
    builder.register_job(JobDefinition::new(
        "medic",
        &[("Paramedic", 1), ("Medic", 2), ("Senior Medic", 3)],
    ))?;
    Ok(())
}

pub fn register_defaults(builder: &mut RegistryBuilder) -> RoleplayResult<()> {
    register_default_items(builder)?;
    register_default_jobs(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roleplay::registry::RegistrationMode;

    #[test]
    fn defaults_register_in_strict_mode() {
        let mut builder = RegistryBuilder::new(RegistrationMode::Strict);
        register_defaults(&mut builder).expect("defaults");
        let registry = builder.build();
        assert_eq!(registry.items().len(), 5);
        assert!(registry.use_handler("Apple").is_some());
        assert!(registry.use_handler("Geldsack").is_some());
        assert_eq!(
            registry.job("police").and_then(|j| j.rank(2)).map(|r| r.name.as_str()),
            Some("Officer")
        );
    }

    #[test]
    fn default_items_are_consumables() {
        let mut builder = RegistryBuilder::new(RegistrationMode::Strict);
        register_default_items(&mut builder).expect("items");
        let registry = builder.build();
        for item in registry.items() {
            assert_eq!(item.category, "consumable", "{}", item.id);
        }
    }

    #[test]
    fn registering_twice_fails_only_in_strict_mode() {
        let mut lenient = RegistryBuilder::new(RegistrationMode::Lenient);
        register_defaults(&mut lenient).expect("first");
        assert!(register_defaults(&mut lenient).is_ok());

        let mut strict = RegistryBuilder::new(RegistrationMode::Strict);
        register_defaults(&mut strict).expect("first");
        assert!(register_defaults(&mut strict).is_err());
    }
}
