/// Dispatch handler plumbing
use std::sync::{Arc, Mutex};

use super::types::DispatchEvent;

/// Single consumer invoked by `calc()`, owned by the aligner.
///
/// The aligner is mutably borrowed while the handler runs, so a handler
/// cannot reach back into the instance that is dispatching.
pub type DispatchHandler = Box<dyn FnMut(DispatchEvent) + Send + Sync>;

/// Collects dispatched events for later inspection
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<DispatchEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that appends every event to this recorder
    pub fn handler(&self) -> DispatchHandler {
        let events = Arc::clone(&self.events);
        Box::new(move |event| {
            let mut events = events.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            events.push(event);
        })
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<DispatchEvent> {
        let mut events = self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *events)
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
