use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CHARACTER_SCHEMA_VERSION: u8 = 1;
pub const VEHICLE_SCHEMA_VERSION: u8 = 1;

/// Health and armor never exceed this value.
pub const MAX_HEALTH: u32 = 100;

// ============================================================================
// Geometry
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

// ============================================================================
// Actors
// ============================================================================

/// The connected player issuing a request. May act on a character other than their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Actor {
    pub id: u64,
    pub name: String,
}

impl Actor {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }

    /// Operator typing into the server console.
    pub fn console() -> Self {
        Self::new(0, "console")
    }
}

// ============================================================================
// Items
// ============================================================================

/// Static metadata for an item kind. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDefinition {
    /// Unique identifier, e.g. `item_apple`
    pub id: String,
    /// Display name; also the key under which the use effect is registered
    pub name: String,
    /// Category tag such as `consumable`
    pub category: String,
    pub description: Option<String>,
    /// Weight of a single unit
    pub weight: u32,
}

impl ItemDefinition {
    pub fn new(id: &str, name: &str, category: &str, weight: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            weight,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// A stack of one item kind inside a character's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryEntry {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub weight: u32,
}

impl InventoryEntry {
    pub fn from_definition(definition: &ItemDefinition, quantity: u32) -> Self {
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            quantity,
            category: definition.category.clone(),
            weight: definition.weight,
        }
    }

    /// Combined weight of every unit in this stack.
    pub fn total_weight(&self) -> u64 {
        self.weight as u64 * self.quantity as u64
    }
}

// ============================================================================
// Money
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Account {
    Cash,
    Bank,
    BlackMoney,
}

impl Account {
    pub const ALL: [Account; 3] = [Account::Cash, Account::Bank, Account::BlackMoney];

    pub fn as_str(&self) -> &'static str {
        match self {
            Account::Cash => "cash",
            Account::Bank => "bank",
            Account::BlackMoney => "black_money",
        }
    }
}

impl FromStr for Account {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cash" => Ok(Account::Cash),
            "bank" => Ok(Account::Bank),
            "black_money" | "blackmoney" | "black" => Ok(Account::BlackMoney),
            other => Err(format!("unknown account '{}'", other)),
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current balances, as pushed to the HUD.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balances {
    pub cash: i64,
    pub bank: i64,
    pub black_money: i64,
}

// ============================================================================
// Jobs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobAssignment {
    pub name: String,
    pub grade: u32,
}

impl JobAssignment {
    pub fn new(name: &str, grade: u32) -> Self {
        Self {
            name: name.to_string(),
            grade,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRank {
    pub name: String,
    pub level: u32,
}

/// A job and its ordered ranks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobDefinition {
    pub name: String,
    pub ranks: Vec<JobRank>,
}

impl JobDefinition {
    pub fn new(name: &str, ranks: &[(&str, u32)]) -> Self {
        Self {
            name: name.to_string(),
            ranks: ranks
                .iter()
                .map(|(rank, level)| JobRank {
                    name: rank.to_string(),
                    level: *level,
                })
                .collect(),
        }
    }

    pub fn rank(&self, level: u32) -> Option<&JobRank> {
        self.ranks.iter().find(|r| r.level == level)
    }
}

// ============================================================================
// Characters
// ============================================================================

/// Persisted state of a single character.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterRecord {
    pub id: String,
    /// Display name; underscores in command arguments map to spaces here
    pub name: String,
    pub cash: i64,
    pub bank: i64,
    pub black_money: i64,
    pub food: i32,
    pub water: i32,
    pub jobs: Vec<JobAssignment>,
    pub inventory: Vec<InventoryEntry>,
    /// Weight capacity of the inventory
    pub max_weight: u32,
    pub health: u32,
    pub armor: u32,
    pub position: Vec3,
    pub dimension: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl CharacterRecord {
    pub fn new(id: &str, name: &str, max_weight: u32) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            cash: 0,
            bank: 0,
            black_money: 0,
            food: 100,
            water: 100,
            jobs: Vec::new(),
            inventory: Vec::new(),
            max_weight,
            health: MAX_HEALTH,
            armor: 0,
            position: Vec3::default(),
            dimension: 0,
            created_at: now,
            updated_at: now,
            schema_version: CHARACTER_SCHEMA_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn balances(&self) -> Balances {
        Balances {
            cash: self.cash,
            bank: self.bank,
            black_money: self.black_money,
        }
    }

    pub fn balance(&self, account: Account) -> i64 {
        match account {
            Account::Cash => self.cash,
            Account::Bank => self.bank,
            Account::BlackMoney => self.black_money,
        }
    }

    pub fn balance_mut(&mut self, account: Account) -> &mut i64 {
        match account {
            Account::Cash => &mut self.cash,
            Account::Bank => &mut self.bank,
            Account::BlackMoney => &mut self.black_money,
        }
    }
}

// ============================================================================
// Vehicles
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleColor {
    pub primary: u8,
    pub primary_custom: Rgba,
    pub secondary: u8,
    pub secondary_custom: Rgba,
    pub wheel: u8,
    pub pearl: u8,
    pub xenon: u8,
}

/// Lock state values understood by the game client.
pub const LOCK_STATE_NONE: u8 = 0;
pub const LOCK_STATE_UNLOCKED: u8 = 1;
pub const LOCK_STATE_LOCKED: u8 = 2;

pub const FULL_VEHICLE_HEALTH: u32 = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VehicleStateProps {
    pub dirt_level: u8,
    pub lock_state: u8,
    pub engine_health: u32,
    pub engine_on: bool,
    pub body_health: u32,
    pub light_state: u8,
}

impl Default for VehicleStateProps {
    fn default() -> Self {
        Self {
            dirt_level: 0,
            lock_state: LOCK_STATE_NONE,
            engine_health: FULL_VEHICLE_HEALTH,
            engine_on: false,
            body_health: FULL_VEHICLE_HEALTH,
            light_state: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NeonPlacement {
    pub front: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleNeon {
    pub color: Rgba,
    pub placement: NeonPlacement,
}

/// Persisted state of an owned vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleRecord {
    pub id: String,
    /// Owning character id
    pub owner: String,
    pub model: String,
    pub pos: Vec3,
    pub rot: Vec3,
    pub dimension: i32,
    /// Character ids holding a key
    pub keys: Vec<String>,
    pub fuel: f32,
    pub number_plate_text: String,
    pub color: VehicleColor,
    pub state: VehicleStateProps,
    pub neon: VehicleNeon,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl VehicleRecord {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock_state == LOCK_STATE_LOCKED
    }
}

/// Summary returned by status queries.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VehicleStatus {
    pub id: String,
    pub model: String,
    pub position: Vec3,
    pub locked: bool,
    pub health: u32,
}

impl From<&VehicleRecord> for VehicleStatus {
    fn from(record: &VehicleRecord) -> Self {
        Self {
            id: record.id.clone(),
            model: record.model.clone(),
            position: record.pos,
            locked: record.is_locked(),
            health: record.state.engine_health,
        }
    }
}
