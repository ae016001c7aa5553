#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for the nodeup installer
//!
//! Library crates never print. Everything the operator sees, and everything
//! that lands in the debug log, is emitted here as an [`AppEvent`] and rendered
//! by the binary.
//!
//! ## Architecture
//!
//! - **Domain-driven events**: one enum per component (Probe, Credentials, ...)
//! - **Unified `EventEmitter` trait**: a single API with helper methods
//! - **Synchronous delivery**: an [`EventSink`] handles each message before
//!   `emit` returns, so status lines are printed before the next prompt or
//!   child process writes to the terminal

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, ContainerStep, ContainersEvent, CredentialsEvent, FailureContext, GeneralEvent,
    InstallEvent, MaterializeEvent, PlatformEvent, ProbeEvent, RuntimeEvent,
};

use std::sync::{mpsc, Arc};

/// Envelope carrying metadata alongside an application event.
#[derive(Debug, Clone)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }
}

/// Receiver of event messages.
///
/// Called on the emitting thread; implementations must not block on user input.
pub trait EventSink: Send + Sync {
    fn handle(&self, message: EventMessage);
}

impl EventSink for mpsc::Sender<EventMessage> {
    fn handle(&self, message: EventMessage) {
        // Receiver dropped means nobody is listening anymore
        let _ = self.send(message);
    }
}

/// Cloneable handle that forwards events to a shared sink
#[derive(Clone)]
pub struct EventSender {
    sink: Arc<dyn EventSink>,
}

impl EventSender {
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn send(&self, message: EventMessage) {
        self.sink.handle(message);
    }
}

impl std::fmt::Debug for EventSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender").finish_non_exhaustive()
    }
}

/// Receiving half returned by [`channel`]
pub type EventReceiver = mpsc::Receiver<EventMessage>;

/// Create a sender whose messages are buffered for later inspection
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel();
    (EventSender::new(tx), rx)
}

/// The unified trait for emitting events throughout nodeup
///
/// This trait provides a single, consistent API for emitting events regardless of
/// whether you have a raw `EventSender` or a struct that contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        self.emit_with_meta(meta, event);
    }

    /// Emit an operator-facing line
    fn emit_notice(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::notice(message)));
    }

    /// Emit a section heading
    fn emit_section(&self, title: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::section(title)));
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
