use std::path::{Path, PathBuf};

use sled::IVec;

use crate::roleplay::errors::RoleplayError;
use crate::roleplay::types::{
    CharacterRecord, VehicleRecord, CHARACTER_SCHEMA_VERSION, VEHICLE_SCHEMA_VERSION,
};

const TREE_CHARACTERS: &str = "rp_characters";
const TREE_CHARACTER_NAMES: &str = "rp_character_names";
const TREE_VEHICLES: &str = "rp_vehicles";

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct RoleplayStoreBuilder {
    path: PathBuf,
    flush_on_write: bool,
}

impl RoleplayStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flush_on_write: true,
        }
    }

    /// Leave flushing to sled's background thread (faster bulk tests).
    pub fn without_flush(mut self) -> Self {
        self.flush_on_write = false;
        self
    }

    pub fn open(self) -> Result<RoleplayStore, RoleplayError> {
        RoleplayStore::open_with_options(self.path, self.flush_on_write)
    }
}

/// Sled-backed persistence for characters and vehicles.
pub struct RoleplayStore {
    _db: sled::Db,
    characters: sled::Tree,
    names: sled::Tree,
    vehicles: sled::Tree,
    flush_on_write: bool,
}

impl RoleplayStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RoleplayError> {
        Self::open_with_options(path, true)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, flush_on_write: bool) -> Result<Self, RoleplayError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let characters = db.open_tree(TREE_CHARACTERS)?;
        let names = db.open_tree(TREE_CHARACTER_NAMES)?;
        let vehicles = db.open_tree(TREE_VEHICLES)?;
        Ok(Self {
            _db: db,
            characters,
            names,
            vehicles,
            flush_on_write,
        })
    }

    fn character_key(id: &str) -> Vec<u8> {
        format!("characters:{}", id).into_bytes()
    }

    fn name_key(name: &str) -> Vec<u8> {
        format!("names:{}", name.to_lowercase()).into_bytes()
    }

    fn vehicle_key(id: &str) -> Vec<u8> {
        format!("vehicles:{}", id).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, RoleplayError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, RoleplayError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn flush(&self, tree: &sled::Tree) -> Result<(), RoleplayError> {
        if self.flush_on_write {
            tree.flush()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Characters
    // ------------------------------------------------------------------

    /// Insert or update a character record and its name index entry.
    pub fn put_character(&self, mut character: CharacterRecord) -> Result<(), RoleplayError> {
        character.schema_version = CHARACTER_SCHEMA_VERSION;
        character.touch();
        let key = Self::character_key(&character.id);
        let bytes = Self::serialize(&character)?;
        if let Some(previous) = self.characters.insert(key, bytes)? {
            let old: CharacterRecord = Self::deserialize(previous)?;
            if old.name.to_lowercase() != character.name.to_lowercase() {
                self.names.remove(Self::name_key(&old.name))?;
            }
        }
        self.names
            .insert(Self::name_key(&character.name), character.id.as_bytes())?;
        self.flush(&self.characters)?;
        self.flush(&self.names)?;
        Ok(())
    }

    /// Write several characters in one atomic batch. Names are assumed unchanged.
    pub fn put_characters(&self, records: &[CharacterRecord]) -> Result<(), RoleplayError> {
        let mut batch = sled::Batch::default();
        let mut names = sled::Batch::default();
        for record in records {
            let mut record = record.clone();
            record.schema_version = CHARACTER_SCHEMA_VERSION;
            batch.insert(Self::character_key(&record.id), Self::serialize(&record)?);
            names.insert(Self::name_key(&record.name), record.id.as_bytes());
        }
        self.characters.apply_batch(batch)?;
        self.names.apply_batch(names)?;
        self.flush(&self.characters)?;
        self.flush(&self.names)?;
        Ok(())
    }

    /// Fetch a character record by id.
    pub fn get_character(&self, id: &str) -> Result<CharacterRecord, RoleplayError> {
        let key = Self::character_key(id);
        let Some(bytes) = self.characters.get(&key)? else {
            return Err(RoleplayError::character_not_found(id));
        };
        let record: CharacterRecord = Self::deserialize(bytes)?;
        if record.schema_version != CHARACTER_SCHEMA_VERSION {
            return Err(RoleplayError::SchemaMismatch {
                entity: "character",
                expected: CHARACTER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    pub fn character_exists(&self, id: &str) -> Result<bool, RoleplayError> {
        Ok(self.characters.contains_key(Self::character_key(id))?)
    }

    /// Resolve a display name (case-insensitive) to a character id.
    pub fn find_character_id_by_name(&self, name: &str) -> Result<Option<String>, RoleplayError> {
        Ok(self
            .names
            .get(Self::name_key(name))?
            .map(|id| String::from_utf8_lossy(&id).into_owned()))
    }

    pub fn find_character_by_name(&self, name: &str) -> Result<CharacterRecord, RoleplayError> {
        match self.find_character_id_by_name(name)? {
            Some(id) => self.get_character(&id),
            None => Err(RoleplayError::character_not_found(name)),
        }
    }

    /// List all character ids currently stored.
    pub fn list_character_ids(&self) -> Result<Vec<String>, RoleplayError> {
        let mut ids = Vec::new();
        for entry in self.characters.scan_prefix(b"characters:") {
            let (key, _) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(id) = text.strip_prefix("characters:") {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    pub fn delete_character(&self, id: &str) -> Result<bool, RoleplayError> {
        let Some(previous) = self.characters.remove(Self::character_key(id))? else {
            return Ok(false);
        };
        let old: CharacterRecord = Self::deserialize(previous)?;
        self.names.remove(Self::name_key(&old.name))?;
        self.flush(&self.characters)?;
        self.flush(&self.names)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Vehicles
    // ------------------------------------------------------------------

    pub fn put_vehicle(&self, mut vehicle: VehicleRecord) -> Result<(), RoleplayError> {
        vehicle.schema_version = VEHICLE_SCHEMA_VERSION;
        vehicle.touch();
        let key = Self::vehicle_key(&vehicle.id);
        let bytes = Self::serialize(&vehicle)?;
        self.vehicles.insert(key, bytes)?;
        self.flush(&self.vehicles)?;
        Ok(())
    }

    pub fn get_vehicle(&self, id: &str) -> Result<VehicleRecord, RoleplayError> {
        let Some(bytes) = self.vehicles.get(Self::vehicle_key(id))? else {
            return Err(RoleplayError::vehicle_not_found(id));
        };
        let record: VehicleRecord = Self::deserialize(bytes)?;
        if record.schema_version != VEHICLE_SCHEMA_VERSION {
            return Err(RoleplayError::SchemaMismatch {
                entity: "vehicle",
                expected: VEHICLE_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    pub fn delete_vehicle(&self, id: &str) -> Result<bool, RoleplayError> {
        let removed = self.vehicles.remove(Self::vehicle_key(id))?.is_some();
        self.flush(&self.vehicles)?;
        Ok(removed)
    }

    /// Every stored vehicle. Records that fail to decode are skipped with a warning.
    pub fn list_vehicles(&self) -> Result<Vec<VehicleRecord>, RoleplayError> {
        let mut vehicles = Vec::new();
        for entry in self.vehicles.scan_prefix(b"vehicles:") {
            let (key, bytes) = entry?;
            match Self::deserialize::<VehicleRecord>(bytes) {
                Ok(record) => vehicles.push(record),
                Err(e) => log::warn!(
                    "skipping unreadable vehicle {}: {}",
                    String::from_utf8_lossy(&key),
                    e
                ),
            }
        }
        Ok(vehicles)
    }

    pub fn list_vehicles_owned_by(&self, owner: &str) -> Result<Vec<VehicleRecord>, RoleplayError> {
        Ok(self
            .list_vehicles()?
            .into_iter()
            .filter(|v| v.owner == owner)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehiclesConfig;
    use crate::roleplay::types::Vec3;
    use crate::roleplay::vehicles::{build_vehicle, VehicleOptions};
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> RoleplayStore {
        RoleplayStoreBuilder::new(dir.path())
            .without_flush()
            .open()
            .expect("store")
    }

    #[test]
    fn character_round_trip_and_name_index() {
        let dir = TempDir::new().expect("tempdir");
        let store = open_store(&dir);
        let mut record = CharacterRecord::new("c1", "John Doe", 40);
        record.cash = 75;
        store.put_character(record).expect("put");

        let loaded = store.get_character("c1").expect("get");
        assert_eq!(loaded.cash, 75);
        let by_name = store.find_character_by_name("john doe").expect("by name");
        assert_eq!(by_name.id, "c1");
        assert_eq!(store.list_character_ids().expect("ids"), vec!["c1".to_string()]);
    }

    #[test]
    fn rename_moves_name_index() {
        let dir = TempDir::new().expect("tempdir");
        let store = open_store(&dir);
        let mut record = CharacterRecord::new("c1", "John Doe", 40);
        store.put_character(record.clone()).expect("put");
        record.name = "Jane Roe".to_string();
        store.put_character(record).expect("rename");
        assert!(store.find_character_id_by_name("John Doe").expect("lookup").is_none());
        assert_eq!(
            store.find_character_id_by_name("Jane Roe").expect("lookup"),
            Some("c1".to_string())
        );
    }

    #[test]
    fn missing_character_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let store = open_store(&dir);
        assert!(matches!(
            store.get_character("ghost"),
            Err(RoleplayError::NotFound(_))
        ));
        assert!(!store.delete_character("ghost").expect("delete"));
    }

    #[test]
    fn vehicles_persist_and_delete() {
        let dir = TempDir::new().expect("tempdir");
        let store = open_store(&dir);
        let vehicle = build_vehicle(
            "c1",
            "sultan",
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::default(),
            VehicleOptions::default(),
            &VehiclesConfig::default(),
        );
        let id = vehicle.id.clone();
        store.put_vehicle(vehicle).expect("put");
        assert_eq!(store.get_vehicle(&id).expect("get").model, "sultan");
        assert_eq!(store.list_vehicles_owned_by("c1").expect("owned").len(), 1);
        assert!(store.delete_vehicle(&id).expect("delete"));
        assert!(store.list_vehicles().expect("list").is_empty());
    }
}
