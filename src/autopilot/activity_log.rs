use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;

pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-size trail of recent autopilot status lines, newest first.
#[derive(Debug)]
pub struct ActivityLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend `<local time> - <message>`, dropping the oldest line when full.
    pub fn record(&mut self, message: impl AsRef<str>) {
        let line = format!("{} - {}", Local::now().format("%H:%M:%S"), message.as_ref());
        if self.lines.len() == self.capacity {
            self.lines.pop_back();
        }
        self.lines.push_front(line);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Activity log shared between the autopilot tasks and the UI.
#[derive(Debug, Clone, Default)]
pub struct SharedActivityLog(Arc<Mutex<ActivityLog>>);

impl SharedActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self(Arc::new(Mutex::new(ActivityLog::new(capacity))))
    }

    pub fn record(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!(target: "newsdesk::activity", "{}", message);
        self.lock().record(message);
    }

    /// Copy of the current lines, newest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().lines().map(str::to_string).collect()
    }

    fn lock(&self) -> MutexGuard<'_, ActivityLog> {
        // A panicked writer cannot leave the deque half-updated, keep going.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
