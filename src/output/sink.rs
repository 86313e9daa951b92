use crate::output::ScoutEvent;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

/// Receiver side of engine notifications
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ScoutEvent);
}

/// Forwards events into a tokio channel
///
/// Events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<ScoutEvent>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<ScoutEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ScoutEvent) {
        let _ = self.tx.send(event);
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ScoutEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events emitted so far
    pub fn events(&self) -> Vec<ScoutEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the status lines emitted so far
    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ScoutEvent::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Returns the `(id, title)` pairs discovered so far
    pub fn discovered(&self) -> Vec<(u64, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ScoutEvent::ItemDiscovered { id, title } => Some((id, title)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: ScoutEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

/// Shared handle the engine uses to notify and log at the same time
///
/// Every status line is also written to the log, which replaces a separate
/// status log file.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn EventSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn status(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!("{}", text);
        self.sink.emit(ScoutEvent::Status(text));
    }

    pub fn item_discovered(&self, id: u64, title: &str) {
        tracing::debug!("Discovered item {}: {}", id, title);
        self.sink.emit(ScoutEvent::ItemDiscovered {
            id,
            title: title.to_string(),
        });
    }

    pub fn detail_ready(&self, id: u64, text: String) {
        tracing::debug!("Detail for item {} ready ({} bytes)", id, text.len());
        self.sink.emit(ScoutEvent::DetailReady { id, text });
    }

    pub fn emit(&self, event: ScoutEvent) {
        self.sink.emit(event);
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}
