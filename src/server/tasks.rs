//! Periodic background passes (save players, save vehicles, food decay).
//!
//! Each task ticks on a fixed period. A tick that arrives while the previous pass is still
//! running is skipped rather than queued, so passes never overlap.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::metrics;
use crate::roleplay::RoleplayService;

/// Held while a pass runs; clears the running flag on drop.
pub struct PassGuard {
    running: Arc<AtomicBool>,
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct PeriodicTask {
    name: &'static str,
    period: Duration,
    running: Arc<AtomicBool>,
    skipped: Arc<AtomicU64>,
}

impl PeriodicTask {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            running: Arc::new(AtomicBool::new(false)),
            skipped: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Claim the task for one pass. `None` when a pass is already running.
    pub fn try_begin(&self) -> Option<PassGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard {
                running: self.running.clone(),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ticks dropped because the previous pass had not finished.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Run `pass` every period until the returned handle is aborted.
    pub fn spawn<F, Fut>(self, mut pass: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match self.try_begin() {
                    Some(guard) => {
                        let work = pass();
                        tokio::spawn(async move {
                            work.await;
                            drop(guard);
                        });
                    }
                    None => {
                        self.skipped.fetch_add(1, Ordering::Relaxed);
                        metrics::inc_save_tick_skipped();
                        debug!("{}: previous pass still running; tick skipped", self.name);
                    }
                }
            }
        })
    }
}

/// Start the save and decay loops for a running service.
pub fn spawn_roleplay_tasks(service: Arc<RoleplayService>) -> Vec<JoinHandle<()>> {
    let config = service.config().clone();
    let mut handles = Vec::new();

    let players = PeriodicTask::new("save-all-players", config.save.players_interval());
    let svc = service.clone();
    handles.push(players.spawn(move || {
        let svc = svc.clone();
        async move {
            let saved = svc.save_all_players().await;
            debug!("saved {} characters", saved);
        }
    }));

    let vehicles = PeriodicTask::new("save-all-vehicles", config.save.vehicles_interval());
    let svc = service.clone();
    handles.push(vehicles.spawn(move || {
        let svc = svc.clone();
        async move {
            let saved = svc.save_all_vehicles();
            debug!("saved {} vehicles", saved);
        }
    }));

    if config.food.use_food {
        let food = PeriodicTask::new("food-decay", config.food.decrease_interval());
        let svc = service.clone();
        handles.push(food.spawn(move || {
            let svc = svc.clone();
            async move {
                let updated = svc.decay_online_characters().await;
                debug!("food decay applied to {} characters", updated);
            }
        }));
    }

    info!("started {} periodic tasks", handles.len());
    handles
}
