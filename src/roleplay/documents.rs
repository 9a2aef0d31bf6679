//! In-memory documents for characters that are currently being played.
//!
//! Binding a character (on connect) makes its document ready and wakes anyone waiting in
//! [`CharacterDocuments::wait_ready`]. Host-pushed state such as position lives here until
//! the periodic save pass writes it to the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use super::errors::{RoleplayError, RoleplayResult};
use super::types::{Actor, CharacterRecord, Vec3, MAX_HEALTH};

struct Document {
    record: CharacterRecord,
    actor: Actor,
}

#[derive(Default)]
pub struct CharacterDocuments {
    docs: RwLock<HashMap<String, Document>>,
    waiters: Mutex<HashMap<String, Arc<Notify>>>,
}

impl CharacterDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    fn notifier(&self, character_id: &str) -> Arc<Notify> {
        let mut waiters = self.waiters.lock().unwrap_or_else(PoisonError::into_inner);
        waiters
            .entry(character_id.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    /// Make a character's document available, played by `actor`.
    pub fn bind(&self, actor: Actor, record: CharacterRecord) {
        let id = record.id.clone();
        {
            let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
            docs.insert(id.clone(), Document { record, actor });
        }
        let notify = self
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if let Some(notify) = notify {
            notify.notify_waiters();
        }
    }

    pub fn unbind(&self, character_id: &str) -> Option<CharacterRecord> {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        docs.remove(character_id).map(|d| d.record)
    }

    pub fn is_bound(&self, character_id: &str) -> bool {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        docs.contains_key(character_id)
    }

    pub fn get(&self, character_id: &str) -> Option<CharacterRecord> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        docs.get(character_id).map(|d| d.record.clone())
    }

    /// Replace the document after a committed mutation. Unbound characters are ignored.
    pub fn replace(&self, record: &CharacterRecord) -> bool {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        match docs.get_mut(&record.id) {
            Some(doc) => {
                doc.record = record.clone();
                true
            }
            None => false,
        }
    }

    pub fn actor_for(&self, character_id: &str) -> Option<Actor> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        docs.get(character_id).map(|d| d.actor.clone())
    }

    pub fn character_for_actor(&self, actor_id: u64) -> Option<String> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        docs.iter()
            .find(|(_, d)| d.actor.id == actor_id)
            .map(|(id, _)| id.clone())
    }

    /// Store host-reported health, armor and position. Persisted by the save pass.
    pub fn update_state(&self, character_id: &str, health: u32, armor: u32, position: Vec3) -> bool {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        match docs.get_mut(character_id) {
            Some(doc) => {
                doc.record.health = health.min(MAX_HEALTH);
                doc.record.armor = armor.min(MAX_HEALTH);
                doc.record.position = position;
                true
            }
            None => false,
        }
    }

    pub fn online_ids(&self) -> Vec<String> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = docs.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn snapshot(&self) -> Vec<CharacterRecord> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        docs.values().map(|d| d.record.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the waiter entry once the last waiter for it gives up.
    fn release_waiter(&self, character_id: &str, notify: Arc<Notify>) {
        let mut waiters = self.waiters.lock().unwrap_or_else(PoisonError::into_inner);
        let ours = waiters
            .get(character_id)
            .is_some_and(|held| Arc::ptr_eq(held, &notify));
        // One count for the map, one for us.
        if ours && Arc::strong_count(&notify) <= 2 {
            waiters.remove(character_id);
        }
    }

    #[cfg(test)]
    fn waiter_count(&self) -> usize {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Wait until the character is bound, or fail with `Timeout`.
    pub async fn wait_ready(
        &self,
        character_id: &str,
        timeout: Duration,
    ) -> RoleplayResult<CharacterRecord> {
        let deadline = Instant::now() + timeout;
        loop {
            let notify = self.notifier(character_id);
            // Register interest before checking so a bind in between is not missed.
            let notified = notify.notified();
            if let Some(record) = self.get(character_id) {
                return Ok(record);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                self.release_waiter(character_id, notify);
                return Err(RoleplayError::Timeout(format!(
                    "character {} after {} ms",
                    character_id,
                    timeout.as_millis()
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> CharacterRecord {
        CharacterRecord::new(id, "John Doe", 40)
    }

    #[tokio::test]
    async fn wait_resolves_when_bound_later() {
        let docs = Arc::new(CharacterDocuments::new());
        let waiter = {
            let docs = docs.clone();
            tokio::spawn(async move { docs.wait_ready("c1", Duration::from_secs(2)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        docs.bind(Actor::new(1, "player"), record("c1"));
        let loaded = waiter.await.expect("join").expect("ready");
        assert_eq!(loaded.id, "c1");
    }

    #[tokio::test]
    async fn wait_times_out_when_never_bound() {
        let docs = CharacterDocuments::new();
        let err = docs
            .wait_ready("ghost", Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(matches!(err, RoleplayError::Timeout(_)));
        assert_eq!(docs.waiter_count(), 0);
    }

    #[tokio::test]
    async fn timed_out_waiter_keeps_entry_for_others() {
        let docs = Arc::new(CharacterDocuments::new());
        let patient = {
            let docs = docs.clone();
            tokio::spawn(async move { docs.wait_ready("c1", Duration::from_secs(2)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(docs.wait_ready("c1", Duration::from_millis(10)).await.is_err());
        assert_eq!(docs.waiter_count(), 1);

        docs.bind(Actor::new(1, "player"), record("c1"));
        assert!(patient.await.expect("join").is_ok());
        assert_eq!(docs.waiter_count(), 0);
    }

    #[tokio::test]
    async fn already_bound_returns_immediately() {
        let docs = CharacterDocuments::new();
        docs.bind(Actor::new(1, "player"), record("c1"));
        assert!(docs.wait_ready("c1", Duration::from_millis(1)).await.is_ok());
    }

    #[test]
    fn host_state_updates_only_bound_documents() {
        let docs = CharacterDocuments::new();
        assert!(!docs.update_state("c1", 50, 0, Vec3::default()));
        docs.bind(Actor::new(3, "player"), record("c1"));
        assert!(docs.update_state("c1", 250, 20, Vec3::new(1.0, 2.0, 3.0)));
        let doc = docs.get("c1").expect("bound");
        assert_eq!(doc.health, 100);
        assert_eq!(doc.armor, 20);
        assert_eq!(docs.character_for_actor(3), Some("c1".to_string()));
        assert_eq!(docs.unbind("c1").map(|r| r.id), Some("c1".to_string()));
        assert!(docs.is_empty());
    }
}
