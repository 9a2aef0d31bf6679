//! Vehicle records: creation with factory defaults, locking, repair and proximity lookups.

use chrono::Utc;
use uuid::Uuid;

use super::types::{
    Vec3, VehicleColor, VehicleNeon, VehicleRecord, VehicleStateProps, FULL_VEHICLE_HEALTH,
    LOCK_STATE_LOCKED, LOCK_STATE_UNLOCKED, VEHICLE_SCHEMA_VERSION,
};
use crate::config::VehiclesConfig;

/// Optional creation parameters. Anything left `None` takes the configured default.
#[derive(Debug, Clone, Default)]
pub struct VehicleOptions {
    pub dimension: i32,
    pub keys: Vec<String>,
    pub fuel: Option<f32>,
    pub number_plate_text: Option<String>,
    pub color: Option<VehicleColor>,
    pub state: Option<VehicleStateProps>,
    pub neon: Option<VehicleNeon>,
}

pub fn build_vehicle(
    owner: &str,
    model: &str,
    pos: Vec3,
    rot: Vec3,
    options: VehicleOptions,
    config: &VehiclesConfig,
) -> VehicleRecord {
    let now = Utc::now();
    let plate = options
        .number_plate_text
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| config.default_plate.clone());
    VehicleRecord {
        id: Uuid::new_v4().to_string(),
        owner: owner.to_string(),
        model: model.to_string(),
        pos,
        rot,
        dimension: options.dimension,
        keys: options.keys,
        fuel: options.fuel.unwrap_or(config.default_fuel),
        number_plate_text: plate,
        color: options.color.unwrap_or_default(),
        state: options.state.unwrap_or_default(),
        neon: options.neon.unwrap_or_default(),
        created_at: now,
        updated_at: now,
        schema_version: VEHICLE_SCHEMA_VERSION,
    }
}

/// Fill gaps left by older records (blank plate, negative fuel).
pub fn apply_load_defaults(record: &mut VehicleRecord, config: &VehiclesConfig) {
    if record.number_plate_text.trim().is_empty() {
        record.number_plate_text = config.default_plate.clone();
    }
    if !(record.fuel.is_finite() && record.fuel >= 0.0) {
        record.fuel = config.default_fuel;
    }
}

/// Flip between locked and unlocked. Returns true when the vehicle is now locked.
pub fn toggle_lock(record: &mut VehicleRecord) -> bool {
    record.state.lock_state = if record.state.lock_state == LOCK_STATE_LOCKED {
        LOCK_STATE_UNLOCKED
    } else {
        LOCK_STATE_LOCKED
    };
    record.touch();
    record.is_locked()
}

pub fn repair(record: &mut VehicleRecord) {
    record.state.engine_health = FULL_VEHICLE_HEALTH;
    record.state.body_health = FULL_VEHICLE_HEALTH;
    record.state.dirt_level = 0;
    record.touch();
}

/// Closest vehicle in the same dimension, with its distance.
pub fn nearest<'a>(
    vehicles: impl IntoIterator<Item = &'a VehicleRecord>,
    position: &Vec3,
    dimension: i32,
) -> Option<(&'a VehicleRecord, f32)> {
    vehicles
        .into_iter()
        .filter(|v| v.dimension == dimension)
        .map(|v| (v, v.pos.distance_to(position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

pub fn lock_state_label(record: &VehicleRecord) -> &'static str {
    match record.state.lock_state {
        LOCK_STATE_LOCKED => "locked",
        LOCK_STATE_UNLOCKED => "unlocked",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sultan(pos: Vec3) -> VehicleRecord {
        build_vehicle(
            "char-1",
            "sultan",
            pos,
            Vec3::default(),
            VehicleOptions::default(),
            &VehiclesConfig::default(),
        )
    }

    #[test]
    fn defaults_applied_on_create() {
        let vehicle = sultan(Vec3::default());
        assert_eq!(vehicle.number_plate_text, "Admin");
        assert_eq!(vehicle.fuel, 100.0);
        assert_eq!(vehicle.state, VehicleStateProps::default());
        assert!(!vehicle.is_locked());
        assert_eq!(lock_state_label(&vehicle), "unknown");
    }

    #[test]
    fn toggle_alternates_lock_state() {
        let mut vehicle = sultan(Vec3::default());
        assert!(toggle_lock(&mut vehicle));
        assert_eq!(lock_state_label(&vehicle), "locked");
        assert!(!toggle_lock(&mut vehicle));
        assert_eq!(vehicle.state.lock_state, LOCK_STATE_UNLOCKED);
    }

    #[test]
    fn repair_restores_health() {
        let mut vehicle = sultan(Vec3::default());
        vehicle.state.engine_health = 120;
        vehicle.state.body_health = 300;
        vehicle.state.dirt_level = 9;
        repair(&mut vehicle);
        assert_eq!(vehicle.state.engine_health, 1000);
        assert_eq!(vehicle.state.body_health, 1000);
        assert_eq!(vehicle.state.dirt_level, 0);
    }

    #[test]
    fn nearest_ignores_other_dimensions() {
        let near = sultan(Vec3::new(3.0, 0.0, 0.0));
        let mut hidden = sultan(Vec3::new(1.0, 0.0, 0.0));
        hidden.dimension = 5;
        let far = sultan(Vec3::new(40.0, 0.0, 0.0));
        let all = vec![near.clone(), hidden, far];
        let (found, distance) = nearest(&all, &Vec3::default(), 0).expect("nearest");
        assert_eq!(found.id, near.id);
        assert!((distance - 3.0).abs() < 0.001);
    }

    #[test]
    fn load_defaults_fill_blank_plate() {
        let mut vehicle = sultan(Vec3::default());
        vehicle.number_plate_text = "  ".to_string();
        vehicle.fuel = f32::NAN;
        apply_load_defaults(&mut vehicle, &VehiclesConfig::default());
        assert_eq!(vehicle.number_plate_text, "Admin");
        assert_eq!(vehicle.fuel, 100.0);
    }
}
