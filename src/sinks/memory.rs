//! In-memory sink
//!
//! Thread-safe via `RwLock`, bounded, not durable. Clones share storage.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use super::{SinkError, VerdictEvent, VerdictSink};

#[derive(Debug, Clone)]
pub struct InMemorySink {
    events: Arc<RwLock<VecDeque<VerdictEvent>>>,
    capacity: usize,
}

impl InMemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity: capacity.max(1),
        }
    }

    /// Snapshot of the retained events, oldest first.
    pub fn events(&self) -> Vec<VerdictEvent> {
        self.events
            .read()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VerdictSink for InMemorySink {
    fn publish(&self, event: &VerdictEvent) -> Result<(), SinkError> {
        let mut events = self
            .events
            .write()
            .map_err(|_| SinkError::Unavailable("in-memory sink lock poisoned".to_string()))?;
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "in-memory"
    }
}
