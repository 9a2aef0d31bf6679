//! UI bridge: typed HUD events pushed over an unbounded channel.
//!
//! Emission is fire-and-forget. A closed receiver only produces a debug log line.

use serde::Serialize;
use tokio::sync::mpsc;

use super::types::{Actor, Balances, InventoryEntry};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", content = "payload")]
pub enum HudEvent {
    #[serde(rename = "updateHUD")]
    Money(Balances),
    #[serde(rename = "hud:update")]
    Status {
        cash: i64,
        bank: i64,
        black_money: i64,
        job_name: String,
        job_grade: String,
    },
    #[serde(rename = "updateFoodHud")]
    Food { food: i32, water: i32 },
    #[serde(rename = "updateInventory")]
    Inventory {
        inventory: Vec<InventoryEntry>,
        max_weight: u32,
    },
    #[serde(rename = "updateVehicleHud")]
    Vehicle {
        fuel: f32,
        engine_on: bool,
        speed: f32,
        locked: bool,
    },
    #[serde(rename = "updateVitals")]
    Vitals { health: u32, armor: u32 },
    #[serde(rename = "notify")]
    Notification { text: String },
}

impl HudEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HudEvent::Money(_) => "updateHUD",
            HudEvent::Status { .. } => "hud:update",
            HudEvent::Food { .. } => "updateFoodHud",
            HudEvent::Inventory { .. } => "updateInventory",
            HudEvent::Vehicle { .. } => "updateVehicleHud",
            HudEvent::Vitals { .. } => "updateVitals",
            HudEvent::Notification { .. } => "notify",
        }
    }

    /// JSON payload as sent to the webview.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::warn!("failed to encode {} event: {}", self.name(), e);
            String::from("{}")
        })
    }
}

/// Who an event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HudTarget {
    /// Whoever is currently playing the character
    Character(String),
    /// A specific connected player
    Actor(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudMessage {
    pub target: HudTarget,
    pub event: HudEvent,
}

#[derive(Clone, Debug)]
pub struct HudBridge {
    tx: mpsc::UnboundedSender<HudMessage>,
}

impl HudBridge {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HudMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, target: HudTarget, event: HudEvent) {
        let name = event.name();
        if self.tx.send(HudMessage { target, event }).is_err() {
            log::debug!("hud receiver closed; dropped {}", name);
        }
    }

    pub fn emit_character(&self, character_id: &str, event: HudEvent) {
        self.emit(HudTarget::Character(character_id.to_string()), event);
    }

    /// Short text notification for a player.
    pub fn notify(&self, actor: &Actor, text: impl Into<String>) {
        self.emit(
            HudTarget::Actor(actor.id),
            HudEvent::Notification { text: text.into() },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_client_names() {
        let event = HudEvent::Food {
            food: 80,
            water: 65,
        };
        let json = event.to_json();
        assert!(json.contains("\"event\":\"updateFoodHud\""));
        assert!(json.contains("\"food\":80"));

        let money = HudEvent::Money(Balances {
            cash: 1,
            bank: 2,
            black_money: 3,
        });
        assert_eq!(money.name(), "updateHUD");
        assert!(money.to_json().contains("\"black_money\":3"));
    }

    #[tokio::test]
    async fn emit_is_fire_and_forget() {
        let (bridge, mut rx) = HudBridge::channel();
        bridge.notify(&Actor::new(7, "tester"), "hello");
        let msg = rx.recv().await.expect("message");
        assert_eq!(msg.target, HudTarget::Actor(7));
        assert_eq!(
            msg.event,
            HudEvent::Notification {
                text: "hello".to_string()
            }
        );

        drop(rx);
        // No receiver left: must not panic or block
        bridge.emit_character("c1", HudEvent::Food { food: 1, water: 1 });
    }
}
