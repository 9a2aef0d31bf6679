//! Per-character mutual exclusion.
//!
//! Every mutation of a character runs while holding that character's async mutex, so two
//! requests against the same character are applied one after the other. Requests that touch
//! two characters take both locks in id order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub type CharacterGuard = OwnedMutexGuard<()>;

#[derive(Default)]
pub struct CharacterLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl CharacterLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, character_id: &str) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(character_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    pub async fn lock(&self, character_id: &str) -> CharacterGuard {
        self.slot(character_id).lock_owned().await
    }

    /// Lock two characters without risking a lock-order deadlock.
    /// The second guard is `None` when both ids are the same character.
    pub async fn lock_pair(
        &self,
        first: &str,
        second: &str,
    ) -> (CharacterGuard, Option<CharacterGuard>) {
        if first == second {
            return (self.lock(first).await, None);
        }
        if first < second {
            let a = self.lock(first).await;
            let b = self.lock(second).await;
            (a, Some(b))
        } else {
            let b = self.lock(second).await;
            let a = self.lock(first).await;
            (a, Some(b))
        }
    }

    /// Drop slots nobody is holding or waiting on.
    pub fn prune(&self) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let before = slots.len();
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        before - slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
