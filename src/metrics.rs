//! Process-wide counters for item use and persistence passes.
//! Read by the `status` command and logged after each save pass.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

static ITEMS_USED: AtomicU64 = AtomicU64::new(0);
static EFFECT_FAILURES: AtomicU64 = AtomicU64::new(0);
static MISSING_HANDLERS: AtomicU64 = AtomicU64::new(0);
static RECORDS_SAVED: AtomicU64 = AtomicU64::new(0);
static PERSIST_FAILURES: AtomicU64 = AtomicU64::new(0);
static SAVE_TICKS_SKIPPED: AtomicU64 = AtomicU64::new(0);

static ITEM_COUNTERS: OnceLock<Mutex<HashMap<String, ItemCounter>>> = OnceLock::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ItemCounter {
    /// Successful uses
    pub uses: u64,
    /// Units requested across those uses
    pub units: u64,
    pub failures: u64,
}

fn item_counter_lock() -> &'static Mutex<HashMap<String, ItemCounter>> {
    ITEM_COUNTERS.get_or_init(|| Mutex::new(HashMap::new()))
}

pub fn record_item_use(item_id: &str, units: u32) -> ItemCounter {
    ITEMS_USED.fetch_add(1, Ordering::Relaxed);
    let mut guard = item_counter_lock()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let counter = guard.entry(item_id.to_string()).or_default();
    counter.uses = counter.uses.saturating_add(1);
    counter.units = counter.units.saturating_add(units as u64);
    *counter
}

pub fn record_effect_failure(item_id: &str) -> ItemCounter {
    EFFECT_FAILURES.fetch_add(1, Ordering::Relaxed);
    let mut guard = item_counter_lock()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let counter = guard.entry(item_id.to_string()).or_default();
    counter.failures = counter.failures.saturating_add(1);
    *counter
}

pub fn inc_missing_handler() {
    MISSING_HANDLERS.fetch_add(1, Ordering::Relaxed);
}

pub fn add_records_saved(count: u64) {
    RECORDS_SAVED.fetch_add(count, Ordering::Relaxed);
}

pub fn inc_persist_failure() {
    PERSIST_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_save_tick_skipped() {
    SAVE_TICKS_SKIPPED.fetch_add(1, Ordering::Relaxed);
}

pub fn item_counters_snapshot() -> HashMap<String, ItemCounter> {
    item_counter_lock()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub items_used: u64,
    pub effect_failures: u64,
    pub missing_handlers: u64,
    pub records_saved: u64,
    pub persist_failures: u64,
    pub save_ticks_skipped: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        items_used: ITEMS_USED.load(Ordering::Relaxed),
        effect_failures: EFFECT_FAILURES.load(Ordering::Relaxed),
        missing_handlers: MISSING_HANDLERS.load(Ordering::Relaxed),
        records_saved: RECORDS_SAVED.load(Ordering::Relaxed),
        persist_failures: PERSIST_FAILURES.load(Ordering::Relaxed),
        save_ticks_skipped: SAVE_TICKS_SKIPPED.load(Ordering::Relaxed),
    }
}
