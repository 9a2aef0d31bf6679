use thiserror::Error;

/// Errors that can arise while mutating characters, inventories and vehicles.
#[derive(Debug, Error)]
pub enum RoleplayError {
    /// Wrapper around sled's error type.
    #[error("persistence failure: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when a character, vehicle, item definition or job is not present.
    #[error("not found: {0}")]
    NotFound(String),

    /// The character exists but holds no inventory entry with this item id.
    #[error("item {0} is not in the inventory")]
    ItemNotInInventory(String),

    /// Non-numeric, zero or negative quantity/amount, or otherwise malformed input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Account balance is smaller than the requested withdrawal.
    #[error("insufficient funds: {account} holds {balance}, needs {requested}")]
    InsufficientFunds {
        account: &'static str,
        balance: i64,
        requested: i64,
    },

    /// Inventory holds fewer units than requested.
    #[error("insufficient quantity of {item}: holds {held}, needs {requested}")]
    InsufficientQuantity {
        item: String,
        held: u32,
        requested: u32,
    },

    /// Weight cap or job slot limit would be exceeded.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// No use effect is registered under the item's display name.
    #[error("no use handler registered for {0}")]
    NoHandlerRegistered(String),

    /// Strict registration mode rejected a second registration under the same key.
    #[error("duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// A use effect returned an error or panicked.
    #[error("item effect failed: {0}")]
    EffectFailed(String),

    /// A bounded wait expired.
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}

impl RoleplayError {
    pub fn character_not_found(character_id: &str) -> Self {
        RoleplayError::NotFound(format!("character {}", character_id))
    }

    pub fn vehicle_not_found(vehicle_id: &str) -> Self {
        RoleplayError::NotFound(format!("vehicle {}", vehicle_id))
    }

    /// True for failures of the backing store rather than of the request itself.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            RoleplayError::Sled(_)
                | RoleplayError::Bincode(_)
                | RoleplayError::Io(_)
                | RoleplayError::SchemaMismatch { .. }
        )
    }
}

pub type RoleplayResult<T> = Result<T, RoleplayError>;
