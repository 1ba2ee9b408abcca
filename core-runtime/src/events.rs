//! # Event Bus System
//!
//! Typed publish/subscribe registry for player lifecycle events.
//!
//! ## Overview
//!
//! The event bus consists of:
//! - **Event Types**: [`PlayerEvent`], one variant per [`EventKind`], each with a
//!   fixed payload shape
//! - **EventBus**: registry of handlers keyed by event kind
//! - **Subscription**: handle returned by [`EventBus::subscribe`] that removes
//!   the handler again
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────────┐   statechange   ┌──────────────┐
//! │ PlaybackSession  ├──────────>│               ├────────────────>│ Now Playing  │
//! └──────────────────┘           │   EventBus    │                 └──────────────┘
//!                                │ (kind -> fns) │   trackchange   ┌──────────────┐
//!                                │               ├────────────────>│ MediaSession │
//!                                └───────────────┘                 └──────────────┘
//! ```
//!
//! ## Delivery
//!
//! Delivery is synchronous: `emit` calls every handler registered for the
//! event's kind before returning. Handlers run outside the registry lock, so
//! they may subscribe, unsubscribe or emit from inside a callback. The order
//! in which handlers of one kind are called is unspecified.
//!
//! ## Fault Isolation
//!
//! A handler that panics is logged and skipped. The remaining handlers of the
//! same emission still run and the panic never reaches the emitter.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventKind, PlayerEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(EventKind::StateChange, |event| {
//!     if let PlayerEvent::StateChange { is_playing } = event {
//!         println!("playing: {is_playing}");
//!     }
//! });
//!
//! assert_eq!(bus.emit(PlayerEvent::StateChange { is_playing: true }), 1);
//! subscription.unsubscribe();
//! assert_eq!(bus.emit(PlayerEvent::StateChange { is_playing: false }), 0);
//! ```

use bridge_traits::Track;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::warn;

// ============================================================================
// Event Types
// ============================================================================

/// Discriminant of a [`PlayerEvent`], used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    StateChange,
    TimeUpdate,
    TrackChange,
    Loaded,
    Error,
}

impl EventKind {
    /// Wire name of the kind, as UI layers refer to it.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::StateChange => "statechange",
            EventKind::TimeUpdate => "timeupdate",
            EventKind::TrackChange => "trackchange",
            EventKind::Loaded => "loaded",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Player lifecycle events published by the playback session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum PlayerEvent {
    /// The active backend confirmed a play/pause transition.
    StateChange { is_playing: bool },
    /// Position report in seconds. `duration` is 0 when unknown.
    TimeUpdate { current_time: f64, duration: f64 },
    /// A new track was dispatched to a backend.
    TrackChange { track: Track },
    /// The backend learned the media duration, in seconds.
    Loaded { duration: f64 },
    /// A backend reported a playback failure.
    Error { detail: String },
}

impl PlayerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PlayerEvent::StateChange { .. } => EventKind::StateChange,
            PlayerEvent::TimeUpdate { .. } => EventKind::TimeUpdate,
            PlayerEvent::TrackChange { .. } => EventKind::TrackChange,
            PlayerEvent::Loaded { .. } => EventKind::Loaded,
            PlayerEvent::Error { .. } => EventKind::Error,
        }
    }

    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayerEvent::StateChange { is_playing: true } => "Playback started",
            PlayerEvent::StateChange { is_playing: false } => "Playback paused",
            PlayerEvent::TimeUpdate { .. } => "Playback position changed",
            PlayerEvent::TrackChange { .. } => "Track changed",
            PlayerEvent::Loaded { .. } => "Media metadata loaded",
            PlayerEvent::Error { .. } => "Playback error",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            PlayerEvent::Error { .. } => EventSeverity::Error,
            PlayerEvent::TrackChange { .. } | PlayerEvent::StateChange { .. } => {
                EventSeverity::Info
            }
            PlayerEvent::TimeUpdate { .. } | PlayerEvent::Loaded { .. } => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Error events
    Error,
}

// ============================================================================
// Event Bus
// ============================================================================

type Handler = Arc<dyn Fn(&PlayerEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<(u64, Handler)>>,
}

impl Registry {
    fn remove(&mut self, kind: EventKind, id: u64) -> bool {
        let Some(handlers) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        before != handlers.len()
    }
}

/// Registry of event handlers keyed by [`EventKind`].
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    ///
    /// The handler stays registered until [`Subscription::unsubscribe`] is
    /// called; dropping the handle does not remove it.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&PlayerEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));

        Subscription {
            id,
            kind,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers `event` to every handler of its kind.
    ///
    /// Returns the number of handlers that completed without panicking.
    pub fn emit(&self, event: PlayerEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = {
            let registry = self.registry.lock();
            registry
                .handlers
                .get(&kind)
                .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        let mut delivered = 0;
        for handler in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(()) => delivered += 1,
                Err(fault) => {
                    warn!(
                        event = %kind,
                        fault = panic_message(fault.as_ref()),
                        "Event handler panicked; continuing with remaining handlers"
                    );
                }
            }
        }
        delivered
    }

    /// Number of handlers registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry
            .lock()
            .handlers
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        let total: usize = registry.handlers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscriber_count", &total)
            .finish()
    }
}

fn panic_message(fault: &(dyn std::any::Any + Send)) -> &str {
    fault
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| fault.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

// ============================================================================
// Subscription Handle
// ============================================================================

/// Handle to a registered handler.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    kind: EventKind,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Removes the handler. Returns `false` if it was already gone or the bus
    /// no longer exists.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.lock().remove(self.kind, self.id),
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
