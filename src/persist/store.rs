use crate::config::FormConfig;
use crate::core::{FieldKind, FormModel};
use crate::persist::snapshot::PersistedSnapshot;
use crate::persist::storage::Storage;
use crate::runtime::scheduler::{Scheduler, SchedulerCommand, TimerEvent};

const AUTOSAVE_KEY: &str = "persist:autosave";
const INPUT_DEBOUNCE_KEY: &str = "persist:input";

/// A snapshot that was applied to the form, and the step it asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restoration {
    pub step: usize,
    pub timestamp: u64,
}

/// Owns the form's single snapshot and the timers that refresh it. Storage
/// failures are logged and swallowed.
pub struct PersistenceStore {
    key: String,
    storage: Box<dyn Storage>,
    scheduler: Scheduler,
    autosave_interval_ms: u64,
    input_debounce_ms: u64,
    max_age_ms: u64,
    running: bool,
}

impl PersistenceStore {
    pub fn new(key: impl Into<String>, storage: Box<dyn Storage>, config: &FormConfig) -> Self {
        Self {
            key: key.into(),
            storage,
            scheduler: Scheduler::new(),
            autosave_interval_ms: config.autosave_interval_ms,
            input_debounce_ms: config.input_debounce_ms,
            max_age_ms: config.max_snapshot_age_ms,
            running: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Overwrites the snapshot with the form's current values.
    pub fn save(&mut self, form: &FormModel, step: usize, now_ms: u64) -> bool {
        let snapshot = PersistedSnapshot::collect(form, step, now_ms);
        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to encode form progress");
                return false;
            }
        };
        match self.storage.set(&self.key, &json) {
            Ok(()) => {
                tracing::debug!(key = %self.key, step, fields = snapshot.data.len(), "form progress saved");
                true
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to save form progress");
                false
            }
        }
    }

    /// Reads the snapshot without applying it. Unusable snapshots read as
    /// absent.
    pub fn load(&self) -> Option<PersistedSnapshot> {
        self.read().and_then(|text| self.parse(&text))
    }

    /// Applies a fresh snapshot to `form`. Stale or unusable snapshots are
    /// removed and nothing is applied.
    pub fn restore(&mut self, form: &mut FormModel, now_ms: u64) -> Option<Restoration> {
        let text = self.read()?;
        let Some(snapshot) = self.parse(&text) else {
            self.clear();
            return None;
        };
        if snapshot.is_stale(now_ms, self.max_age_ms) {
            tracing::info!(key = %self.key, saved_at = snapshot.timestamp, "discarding stale form progress");
            self.clear();
            return None;
        }

        for (name, value) in &snapshot.data {
            apply_saved_value(form, name, value);
        }
        tracing::debug!(key = %self.key, step = snapshot.current_step, "form progress restored");

        Some(Restoration {
            step: snapshot.current_step,
            timestamp: snapshot.timestamp,
        })
    }

    pub fn clear(&mut self) -> bool {
        match self.storage.remove(&self.key) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to clear form progress");
                false
            }
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.scheduler.schedule(
            SchedulerCommand::Every {
                key: AUTOSAVE_KEY.to_string(),
                interval_ms: self.autosave_interval_ms,
                event: TimerEvent::AutoSave,
            },
            now_ms,
        );
        self.running = true;
    }

    /// Cancels the periodic and debounce timers.
    pub fn stop(&mut self) {
        self.scheduler.cancel_all();
        self.running = false;
    }

    /// Schedules a debounced save for an input on a field of `kind`.
    /// Password input never triggers a save.
    pub fn on_input(&mut self, kind: FieldKind, now_ms: u64) -> bool {
        if !self.running || kind == FieldKind::Password {
            return false;
        }
        self.scheduler.schedule(
            SchedulerCommand::Debounce {
                key: INPUT_DEBOUNCE_KEY.to_string(),
                delay_ms: self.input_debounce_ms,
                event: TimerEvent::DebouncedSave,
            },
            now_ms,
        );
        true
    }

    pub fn cancel_pending_input(&mut self) {
        self.scheduler.schedule(
            SchedulerCommand::Cancel {
                key: INPUT_DEBOUNCE_KEY.to_string(),
            },
            0,
        );
    }

    pub fn has_pending_input(&self) -> bool {
        self.scheduler.is_pending(INPUT_DEBOUNCE_KEY)
    }

    /// Timer events due at `now_ms`.
    pub fn due(&mut self, now_ms: u64) -> Vec<TimerEvent> {
        self.scheduler.drain_ready(now_ms)
    }

    fn read(&self) -> Option<String> {
        match self.storage.get(&self.key) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to read form progress");
                None
            }
        }
    }

    fn parse(&self, text: &str) -> Option<PersistedSnapshot> {
        match PersistedSnapshot::from_json(text) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "discarding unusable form progress");
                None
            }
        }
    }
}

impl std::fmt::Debug for PersistenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceStore")
            .field("key", &self.key)
            .field("running", &self.running)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

fn apply_saved_value(form: &mut FormModel, name: &str, value: &str) {
    let targets: Vec<(String, FieldKind, bool)> = form
        .fields_named(name)
        .filter(|field| field.kind.is_persistable())
        .map(|field| (field.id.clone(), field.kind, field.value == value))
        .collect();

    for (id, kind, matches) in targets {
        let applied = if kind.is_checkable() {
            form.set_checked(&id, matches).map(|_| ())
        } else {
            form.set_value(&id, value).map(|_| ())
        };
        if let Err(err) = applied {
            tracing::debug!(field = %id, error = %err, "could not restore field");
        }
    }
}
