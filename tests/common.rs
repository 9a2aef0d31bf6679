//! Test utilities & fixtures.
//! Builds a service over a throwaway sled store with the built-in items and jobs.

use std::sync::Arc;

use rpcore::config::Config;
use rpcore::roleplay::{HudBridge, HudEvent, HudMessage, RoleplayService, RoleplayStore};
use rpcore::server::RoleplayServer;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// Default config pointed at `dir`, with a short readiness timeout.
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = dir.path().join("rp").to_string_lossy().to_string();
    config.characters.ready_timeout_ms = 200;
    config
}

pub fn open_service(config: Config) -> (Arc<RoleplayService>, UnboundedReceiver<HudMessage>) {
    let store = RoleplayStore::open(&config.storage.data_dir).expect("open store");
    let registry = RoleplayServer::build_registry(&config).expect("registry");
    let (hud, rx) = HudBridge::channel();
    let service = RoleplayService::new(config, Arc::new(registry), Arc::new(store), hud);
    (Arc::new(service), rx)
}

/// Everything emitted so far.
#[allow(dead_code)]
pub fn drain(rx: &mut UnboundedReceiver<HudMessage>) -> Vec<HudMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

/// Names of the drained events, in order.
#[allow(dead_code)]
pub fn event_names(rx: &mut UnboundedReceiver<HudMessage>) -> Vec<&'static str> {
    drain(rx).iter().map(|m| m.event.name()).collect()
}

#[allow(dead_code)]
pub fn notifications(messages: &[HudMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| match &m.event {
            HudEvent::Notification { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}
