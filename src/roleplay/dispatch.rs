//! Item use dispatch.
//!
//! Resolves the used inventory entry, finds the effect registered under the item's name and
//! runs it against a working copy of the character. The copy is committed only when the
//! effect returns `Ok`; an error or a panic inside the effect leaves every ledger untouched
//! and is reported to the player instead of being propagated.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::{error, info, warn};

use super::effects::{Touched, UseContext};
use super::errors::{RoleplayError, RoleplayResult};
use super::inventory;
use super::service::RoleplayService;
use super::types::{Actor, CharacterRecord};
use crate::logutil::{actor_tag, escape_log};
use crate::metrics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemUseOutcome {
    /// The effect ran and its changes were committed.
    Used {
        item_name: String,
        quantity: u32,
        notices: Vec<String>,
    },
    /// The item exists but nothing knows how to use it.
    NoHandler { item_name: String },
    /// The effect failed; nothing was changed.
    Failed { item_name: String, reason: String },
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "effect panicked".to_string()
    }
}

impl RoleplayService {
    /// Use `quantity` units of an inventory item.
    ///
    /// Errors are returned only when the request cannot be resolved (unknown character,
    /// item not held, zero quantity) or when committing the result fails. Effect failures
    /// come back as [`ItemUseOutcome::Failed`].
    pub async fn handle_item_use(
        &self,
        actor: &Actor,
        character_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> RoleplayResult<ItemUseOutcome> {
        if quantity == 0 {
            return Err(RoleplayError::InvalidArgument(
                "quantity must be positive".to_string(),
            ));
        }

        let _guard = self.locks.lock(character_id).await;
        let record = self.load(character_id)?;
        let Some(entry) = inventory::find_entry(&record, item_id).cloned() else {
            self.hud.notify(actor, format!("You do not have {}.", item_id));
            return Err(RoleplayError::ItemNotInInventory(item_id.to_string()));
        };

        let Some(effect) = self.registry.use_handler(&entry.name) else {
            metrics::inc_missing_handler();
            warn!("no use handler registered for '{}'", escape_log(&entry.name));
            self.hud
                .notify(actor, format!("{} cannot be used.", entry.name));
            return Ok(ItemUseOutcome::NoHandler {
                item_name: entry.name,
            });
        };

        let mut working = record;
        let applied = {
            let mut ctx = UseContext::new(
                actor,
                entry.clone(),
                quantity,
                &mut working,
                &self.config.food,
            );
            match panic::catch_unwind(AssertUnwindSafe(|| effect.apply(&mut ctx))) {
                Ok(Ok(())) => Ok((ctx.touched(), ctx.into_notices())),
                Ok(Err(e)) => Err(e.to_string()),
                Err(payload) => Err(panic_message(payload)),
            }
        };

        match applied {
            Ok((touched, notices)) => {
                let committed = self.commit(working)?;
                metrics::record_item_use(&entry.id, quantity);
                info!(
                    "{} used {}x {} on {}",
                    actor_tag(actor),
                    quantity,
                    escape_log(&entry.name),
                    character_id
                );
                self.emit_touched(touched, &committed);
                for notice in &notices {
                    self.hud.notify(actor, notice.clone());
                }
                Ok(ItemUseOutcome::Used {
                    item_name: entry.name,
                    quantity,
                    notices,
                })
            }
            Err(reason) => {
                metrics::record_effect_failure(&entry.id);
                error!(
                    "use of {} by {} failed: {}",
                    escape_log(&entry.name),
                    character_id,
                    escape_log(&reason)
                );
                self.hud
                    .notify(actor, format!("Could not use {}: {}", entry.name, reason));
                Ok(ItemUseOutcome::Failed {
                    item_name: entry.name,
                    reason,
                })
            }
        }
    }

    fn emit_touched(&self, touched: Touched, record: &CharacterRecord) {
        if touched.money {
            self.emit_money(record);
        }
        if touched.food {
            self.emit_food(record);
        }
        if touched.inventory {
            self.emit_inventory(record);
        }
        if touched.health {
            self.emit_vitals(record);
        }
    }
}
