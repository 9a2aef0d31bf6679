use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use super::commands::CommandProcessor;
use super::tasks::spawn_roleplay_tasks;
use crate::config::Config;
use crate::logutil::escape_log;
use crate::metrics;
use crate::roleplay::{
    register_defaults, Actor, HudBridge, HudEvent, HudMessage, HudTarget, RegistrationMode,
    Registry, RegistryBuilder, RoleplayService, RoleplayStore,
};

/// # Roleplay Server
///
/// Owns the store, the frozen registry and the [`RoleplayService`], runs the periodic save
/// and decay passes, and reads operator commands from stdin.
///
/// ```text
/// stdin ──→ CommandProcessor ──→ RoleplayService ──→ RoleplayStore (sled)
///                                      │
///                                      └──→ HudBridge ──→ HUD consumer
/// ```
pub struct RoleplayServer {
    config: Config,
    service: Arc<RoleplayService>,
    processor: CommandProcessor,
    hud_rx: Option<UnboundedReceiver<HudMessage>>,
    tasks: Vec<JoinHandle<()>>,
}

impl RoleplayServer {
    pub async fn new(config: Config) -> Result<Self> {
        let store = RoleplayStore::open(&config.storage.data_dir).with_context(|| {
            format!("Failed to open data store at {}", config.storage.data_dir)
        })?;
        let registry = Self::build_registry(&config)?;
        let (hud, hud_rx) = HudBridge::channel();
        let service = Arc::new(RoleplayService::new(
            config.clone(),
            Arc::new(registry),
            Arc::new(store),
            hud,
        ));
        Ok(Self {
            processor: CommandProcessor::new(service.clone()),
            config,
            service,
            hud_rx: Some(hud_rx),
            tasks: Vec::new(),
        })
    }

    /// Register built-in items and jobs, then freeze.
    pub fn build_registry(config: &Config) -> Result<Registry> {
        let mut builder = RegistryBuilder::new(RegistrationMode::from_strict(config.registry.strict));
        register_defaults(&mut builder).context("Failed to register built-in items and jobs")?;
        Ok(builder.build())
    }

    pub fn service(&self) -> Arc<RoleplayService> {
        self.service.clone()
    }

    pub fn processor(&self) -> &CommandProcessor {
        &self.processor
    }

    /// Take the HUD receiver to forward events somewhere other than the log.
    pub fn take_hud_receiver(&mut self) -> Option<UnboundedReceiver<HudMessage>> {
        self.hud_rx.take()
    }

    fn spawn_hud_logger(&mut self) {
        let Some(mut rx) = self.hud_rx.take() else {
            return;
        };
        self.tasks.push(tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let target = match &msg.target {
                    HudTarget::Character(id) => format!("character {}", id),
                    HudTarget::Actor(id) => format!("player {}", id),
                };
                match &msg.event {
                    HudEvent::Notification { text } => {
                        info!("[notify {}] {}", target, escape_log(text))
                    }
                    event => debug!("[hud {}] {}", target, event.to_json()),
                }
            }
        }));
    }

    /// Spawn vehicles and background tasks, then process stdin until EOF or Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        info!("Roleplay server '{}' starting", self.config.server.name);
        let spawned = self.service.load_vehicles()?;
        info!("{} vehicles spawned from storage", spawned);

        self.spawn_hud_logger();
        self.tasks.extend(spawn_roleplay_tasks(self.service.clone()));

        let console = Actor::console();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        loop {
            if self.config.server.show_prompt {
                stdout.write_all(b"> ").await?;
                stdout.flush().await?;
            }
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) if line.trim().is_empty() => continue,
                        Some(line) => {
                            let reply = self.processor.process(&console, &line).await;
                            stdout.write_all(reply.as_bytes()).await?;
                            stdout.write_all(b"\n").await?;
                        }
                        None => {
                            info!("stdin closed");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Stop background tasks and flush every played character and spawned vehicle.
    pub async fn shutdown(&mut self) {
        info!("Shutting down roleplay server...");
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
        for id in self.service.documents().online_ids() {
            if let Err(e) = self.service.disconnect_character(&id).await {
                warn!("Failed to save character {} on shutdown: {}", id, e);
            }
        }
        let vehicles = self.service.save_all_vehicles();
        info!("Saved {} vehicles; shutdown complete", vehicles);
    }

    pub fn show_status(&self) -> Result<()> {
        let store = self.service.store();
        let snap = metrics::snapshot();
        println!("=== {} Status ===", self.config.server.name);
        println!("Data directory: {}", self.config.storage.data_dir);
        println!("Characters: {}", store.list_character_ids()?.len());
        println!("Vehicles: {}", store.list_vehicles()?.len());
        println!("Online: {}", self.service.documents().len());
        println!(
            "Registry: {} items, {} jobs ({})",
            self.service.registry().items().len(),
            self.service.registry().jobs().len(),
            if self.config.registry.strict { "strict" } else { "lenient" }
        );
        println!(
            "Items used: {} (failures {}, missing handlers {})",
            snap.items_used, snap.effect_failures, snap.missing_handlers
        );
        println!(
            "Records saved: {} (persist failures {}, skipped ticks {})",
            snap.records_saved, snap.persist_failures, snap.save_ticks_skipped
        );
        Ok(())
    }
}
