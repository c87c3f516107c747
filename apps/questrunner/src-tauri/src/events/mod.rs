//! Event bus for process-runner notifications and catalog changes.
//!
//! The process runner emits lifecycle events without knowing who consumes
//! them. The tracker handler applies them to the active list; the frontend
//! forwarder (desktop builds) relays everything to the webview.

pub mod handlers;
pub mod types;

pub use types::{
    AppEvent, ProcessEventPayload, EVT_BACKGROUND_PROCESS_EXITED, EVT_BACKGROUND_PROCESS_RESULT,
    EVT_CATALOG_CHANGED,
};

use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the event channel.
/// Events beyond this will cause receivers to lag.
const CHANNEL_CAPACITY: usize = 256;

/// The central event bus for application-wide event distribution.
///
/// Uses a broadcast channel so every subscriber sees every event, in
/// emission order. Emitting never blocks.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Emit an event to all subscribers.
    ///
    /// Does not fail when nobody is listening.
    pub fn emit(&self, event: AppEvent) {
        tracing::trace!("Event emitted: {}", event.description());
        let _ = self.sender.send(event);
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Anything that can hand an event to the bus.
pub trait EventEmitter: Send + Sync {
    fn emit_event(&self, event: AppEvent);
}

impl EventEmitter for EventBus {
    fn emit_event(&self, event: AppEvent) {
        self.emit(event);
    }
}

impl EventEmitter for Arc<EventBus> {
    fn emit_event(&self, event: AppEvent) {
        self.emit(event);
    }
}
