//! Bounded append-only event journal.
//!
//! Keeps the most recent entries only; the oldest are silently dropped, not
//! archived. Durable history is out of scope for the engine.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::config::defaults::EVENT_LOG_LEN;
use crate::types::{Event, EventKind};

/// Ring-buffered domain event journal.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(EVENT_LOG_LEN),
        }
    }

    /// Append an entry stamped with `now`, evicting the oldest past capacity.
    pub fn push(&mut self, kind: EventKind, message: impl Into<String>, now: DateTime<Utc>) {
        if self.entries.len() >= EVENT_LOG_LEN {
            self.entries.pop_front();
        }
        self.entries.push_back(Event {
            timestamp: now,
            kind,
            message: message.into(),
        });
    }

    /// Entries oldest-first.
    pub fn entries(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<Event> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_order() {
        let mut log = EventLog::new();
        let now = Utc::now();
        log.push(EventKind::Info, "first", now);
        log.push(EventKind::Control, "second", now);

        let msgs: Vec<&str> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(msgs, vec!["first", "second"]);
    }

    #[test]
    fn test_bounded_to_fifty() {
        let mut log = EventLog::new();
        let now = Utc::now();
        for i in 0..120 {
            log.push(EventKind::Info, format!("event {i}"), now);
        }

        assert_eq!(log.len(), EVENT_LOG_LEN);
        // Oldest surviving entry is number 70 (120 - 50)
        assert_eq!(
            log.entries().next().map(|e| e.message.as_str()),
            Some("event 70")
        );
        assert_eq!(
            log.entries().last().map(|e| e.message.as_str()),
            Some("event 119")
        );
    }
}
