use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    AutoSave,
    DebouncedSave,
}

#[derive(Debug, Clone)]
pub enum SchedulerCommand {
    /// Replaces any pending task under the same key.
    Debounce {
        key: String,
        delay_ms: u64,
        event: TimerEvent,
    },
    Every {
        key: String,
        interval_ms: u64,
        event: TimerEvent,
    },
    Cancel {
        key: String,
    },
}

#[derive(Debug, Clone)]
struct Guard {
    key: String,
    version: u64,
}

#[derive(Debug, Clone)]
struct DelayedTask {
    due_at: u64,
    interval_ms: Option<u64>,
    guard: Guard,
    event: TimerEvent,
}

/// Timer queue driven by caller-supplied timestamps. Cancelling or
/// re-scheduling a key bumps its version, which invalidates older tasks.
#[derive(Debug, Default)]
pub struct Scheduler {
    delayed: Vec<DelayedTask>,
    key_versions: HashMap<String, u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, command: SchedulerCommand, now: u64) {
        match command {
            SchedulerCommand::Debounce {
                key,
                delay_ms,
                event,
            } => {
                let version = self.bump_version(&key);
                self.push(key, version, now + delay_ms, None, event);
            }
            SchedulerCommand::Every {
                key,
                interval_ms,
                event,
            } => {
                let interval_ms = interval_ms.max(1);
                let version = self.bump_version(&key);
                self.push(key, version, now + interval_ms, Some(interval_ms), event);
            }
            SchedulerCommand::Cancel { key } => {
                self.bump_version(&key);
                self.delayed.retain(|task| task.guard.key != key);
            }
        }
    }

    pub fn cancel_all(&mut self) {
        let keys: Vec<String> = self.key_versions.keys().cloned().collect();
        for key in keys {
            self.bump_version(&key);
        }
        self.delayed.clear();
    }

    /// Due events in due-time order. Interval tasks fire once per drain and
    /// move to their next slot after `now`.
    pub fn drain_ready(&mut self, now: u64) -> Vec<TimerEvent> {
        self.delayed.retain(|task| {
            let current = self.key_versions.get(&task.guard.key).copied().unwrap_or(0);
            current == task.guard.version
        });

        let mut fired = Vec::<(u64, TimerEvent)>::new();
        let mut idx = 0usize;
        while idx < self.delayed.len() {
            if self.delayed[idx].due_at > now {
                idx += 1;
                continue;
            }
            let task = &mut self.delayed[idx];
            fired.push((task.due_at, task.event));
            match task.interval_ms {
                Some(interval) => {
                    while task.due_at <= now {
                        task.due_at += interval;
                    }
                    idx += 1;
                }
                None => {
                    self.delayed.swap_remove(idx);
                }
            }
        }

        fired.sort_by_key(|(due, _)| *due);
        fired.into_iter().map(|(_, event)| event).collect()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        let current = self.key_versions.get(key).copied().unwrap_or(0);
        self.delayed
            .iter()
            .any(|task| task.guard.key == key && task.guard.version == current)
    }

    fn push(
        &mut self,
        key: String,
        version: u64,
        due_at: u64,
        interval_ms: Option<u64>,
        event: TimerEvent,
    ) {
        self.delayed.push(DelayedTask {
            due_at,
            interval_ms,
            guard: Guard { key, version },
            event,
        });
    }

    fn bump_version(&mut self, key: &str) -> u64 {
        let entry = self.key_versions.entry(key.to_string()).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }
}

#[cfg(test)]
mod tests {
    use super::{Scheduler, SchedulerCommand, TimerEvent};

    fn debounce(key: &str, delay_ms: u64) -> SchedulerCommand {
        SchedulerCommand::Debounce {
            key: key.to_string(),
            delay_ms,
            event: TimerEvent::DebouncedSave,
        }
    }

    #[test]
    fn debounce_replaces_pending_task() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(debounce("save", 1_000), 0);
        scheduler.schedule(debounce("save", 1_000), 600);

        assert!(scheduler.drain_ready(1_000).is_empty());
        assert_eq!(scheduler.drain_ready(1_600), vec![TimerEvent::DebouncedSave]);
        assert!(scheduler.drain_ready(5_000).is_empty());
    }

    #[test]
    fn cancel_drops_pending_task() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(debounce("save", 10), 0);
        assert!(scheduler.is_pending("save"));
        scheduler.schedule(
            SchedulerCommand::Cancel {
                key: "save".to_string(),
            },
            5,
        );
        assert!(!scheduler.is_pending("save"));
        assert!(scheduler.drain_ready(100).is_empty());
    }

    #[test]
    fn interval_repeats_until_cancelled() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(
            SchedulerCommand::Every {
                key: "auto".to_string(),
                interval_ms: 30,
                event: TimerEvent::AutoSave,
            },
            0,
        );

        assert!(scheduler.drain_ready(29).is_empty());
        assert_eq!(scheduler.drain_ready(30), vec![TimerEvent::AutoSave]);
        assert!(scheduler.drain_ready(59).is_empty());
        assert_eq!(scheduler.drain_ready(95), vec![TimerEvent::AutoSave]);
        assert!(scheduler.drain_ready(119).is_empty());
        assert!(scheduler.is_pending("auto"));

        scheduler.cancel_all();
        assert!(!scheduler.is_pending("auto"));
        assert!(scheduler.drain_ready(1_000).is_empty());
    }

    #[test]
    fn drained_events_follow_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(
            SchedulerCommand::Every {
                key: "auto".to_string(),
                interval_ms: 50,
                event: TimerEvent::AutoSave,
            },
            0,
        );
        scheduler.schedule(debounce("save", 10), 0);
        assert_eq!(
            scheduler.drain_ready(60),
            vec![TimerEvent::DebouncedSave, TimerEvent::AutoSave]
        );
    }
}
