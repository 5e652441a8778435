//! Hand-off point between the instrumentation and whatever delivers events
//! to the collection endpoint.

use std::sync::Arc;

use autotrack_core_types::Properties;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// An emitted event. Built once, handed to the sink, never retained.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackedEvent {
    pub name: String,
    pub properties: Properties,
}

impl TrackedEvent {
    pub fn new(name: impl Into<String>, properties: Properties) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

#[derive(Debug, Error, Clone)]
pub enum SinkError {
    #[error("transport rejected event: {0}")]
    Rejected(String),
}

/// Transport implemented by the host.
pub trait EventSink: Send + Sync {
    fn track(&self, event: TrackedEvent) -> Result<(), SinkError>;
}

/// Records every event and fans it out to subscribers. Suitable for tests and
/// the replay tool.
pub struct InMemorySink {
    sender: broadcast::Sender<TrackedEvent>,
    recorded: Mutex<Vec<TrackedEvent>>,
}

impl InMemorySink {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self {
            sender,
            recorded: Mutex::new(Vec::new()),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackedEvent> {
        self.sender.subscribe()
    }

    pub fn events(&self) -> Vec<TrackedEvent> {
        self.recorded.lock().clone()
    }

    pub fn take(&self) -> Vec<TrackedEvent> {
        std::mem::take(&mut *self.recorded.lock())
    }

    pub fn len(&self) -> usize {
        self.recorded.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for InMemorySink {
    fn track(&self, event: TrackedEvent) -> Result<(), SinkError> {
        debug!(target: "autotrack.sink", name = %event.name, "event recorded");
        self.recorded.lock().push(event.clone());
        // No subscribers is fine; the event is still recorded.
        let _ = self.sender.send(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_broadcasts() {
        let sink = InMemorySink::new(4);
        let mut rx = sink.subscribe();
        let mut props = Properties::new();
        props.insert("event_type".into(), "click".into());

        sink.track(TrackedEvent::new("$web_event", props)).unwrap();

        assert_eq!(sink.len(), 1);
        let received = rx.try_recv().unwrap();
        assert_eq!(received.name, "$web_event");
        assert_eq!(
            received.property("event_type"),
            Some(&serde_json::json!("click"))
        );
        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }
}
