//! Hunger and thirst: clamped additions and randomized decay.

use rand::Rng;

use super::types::CharacterRecord;
use crate::config::{DecreaseRange, FoodConfig};

/// Change requested for a food or water value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodDelta {
    /// Set to the configured maximum
    Fill,
    /// Add (or subtract) and clamp into [min, max]
    By(i32),
}

impl FoodDelta {
    /// Wire form used by commands and item effects: `-1` means fill.
    pub fn from_raw(raw: i32) -> Self {
        if raw == -1 {
            FoodDelta::Fill
        } else {
            FoodDelta::By(raw)
        }
    }

    fn apply(self, current: i32, min: i32, max: i32) -> i32 {
        match self {
            FoodDelta::Fill => max,
            FoodDelta::By(delta) => current.saturating_add(delta).clamp(min, max),
        }
    }
}

/// Apply food and water deltas to a record. Returns the new (food, water).
pub fn add_food_and_water(
    record: &mut CharacterRecord,
    food: FoodDelta,
    water: FoodDelta,
    config: &FoodConfig,
) -> (i32, i32) {
    record.food = food.apply(record.food, config.min_food, config.max_food);
    record.water = water.apply(record.water, config.min_water, config.max_water);
    (record.food, record.water)
}

fn roll(rng: &mut impl Rng, range: DecreaseRange) -> i32 {
    if range.max <= range.min {
        return range.min;
    }
    rng.gen_range(range.min..=range.max)
}

/// One decay step: subtract a random amount from each value, floored at the minimum.
/// Returns the new (food, water).
pub fn decay(record: &mut CharacterRecord, config: &FoodConfig, rng: &mut impl Rng) -> (i32, i32) {
    let food_loss = roll(rng, config.food_decrease);
    let water_loss = roll(rng, config.water_decrease);
    record.food = record.food.saturating_sub(food_loss).max(config.min_food);
    record.water = record.water.saturating_sub(water_loss).max(config.min_water);
    log::debug!(
        "{} lost {} food and {} water",
        record.id,
        food_loss,
        water_loss
    );
    (record.food, record.water)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn character(food: i32, water: i32) -> CharacterRecord {
        let mut record = CharacterRecord::new("char-1", "John Doe", 40);
        record.food = food;
        record.water = water;
        record
    }

    #[test]
    fn fill_sets_maximum_regardless_of_prior_value() {
        let config = FoodConfig::default();
        for start in [0, 37, 100] {
            let mut record = character(start, start);
            let (food, water) =
                add_food_and_water(&mut record, FoodDelta::Fill, FoodDelta::Fill, &config);
            assert_eq!((food, water), (100, 100));
        }
    }

    #[test]
    fn deltas_clamp_into_range() {
        let config = FoodConfig::default();
        let mut record = character(90, 5);
        add_food_and_water(&mut record, FoodDelta::By(15), FoodDelta::By(-20), &config);
        assert_eq!(record.food, 100);
        assert_eq!(record.water, 0);
    }

    #[test]
    fn raw_minus_one_is_fill() {
        assert_eq!(FoodDelta::from_raw(-1), FoodDelta::Fill);
        assert_eq!(FoodDelta::from_raw(-2), FoodDelta::By(-2));
        assert_eq!(FoodDelta::from_raw(15), FoodDelta::By(15));
    }

    #[test]
    fn decay_stays_within_configured_range() {
        let config = FoodConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut record = character(50, 50);
            let (food, water) = decay(&mut record, &config, &mut rng);
            assert!((43..=47).contains(&food), "food {}", food);
            assert!((43..=47).contains(&water), "water {}", water);
        }
    }

    #[test]
    fn decay_floors_at_minimum() {
        let config = FoodConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut record = character(2, 0);
        decay(&mut record, &config, &mut rng);
        assert_eq!((record.food, record.water), (0, 0));
    }
}
