//! The view side of the bridge.

use std::sync::Arc;

use crate::envelope::{Direction, Message};
use crate::error::BridgeError;
use crate::transport::Transport;

use super::{BridgeConfig, Emitter, EndpointCore};

/// The view side's handle to the bridge, living with the embedded content
/// runtime.
///
/// The view runtime owns a single execution context; it calls [`pump`] from
/// that context to deliver queued host messages one at a time, so handlers
/// never run concurrently with each other. `emit` may be called from page
/// handlers at any point and never blocks.
///
/// Dropping the endpoint ends the bridge session.
///
/// [`pump`]: ViewEndpoint::pump
pub struct ViewEndpoint<T: Transport> {
    core: Arc<EndpointCore<T>>,
}

impl<T: Transport> ViewEndpoint<T> {
    /// Create a view endpoint over one half of a transport.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, BridgeConfig::default())
    }

    /// Create a view endpoint with explicit options.
    pub fn with_config(transport: T, config: BridgeConfig) -> Self {
        Self {
            core: Arc::new(EndpointCore::new(transport, Direction::ViewToHost, config)),
        }
    }

    /// Register the callback invoked once per inbound host message.
    /// Overwrites any prior registration; last registration wins.
    pub fn set_inbound_handler(&self, handler: impl FnMut(Message) + Send + 'static) {
        self.core.set_inbound_handler(handler);
    }

    /// Empty the handler slot. Subsequent inbound messages are dropped
    /// without error.
    pub fn clear_inbound_handler(&self) {
        self.core.clear_inbound_handler();
    }

    /// Send a view→host message. Fire-and-forget: the call never blocks and
    /// returns before anything is delivered.
    pub fn emit(&self, message: Message) -> Result<(), BridgeError> {
        self.core.emit(message)
    }

    /// An outbound-only handle for emitting from inside handlers.
    pub fn emitter(&self) -> Emitter<T> {
        Emitter::new(Arc::clone(&self.core))
    }

    /// Deliver queued host→view messages to the registered handler, in
    /// arrival order. Returns the number delivered. Not reentrant.
    pub fn pump(&self) -> usize {
        self.core.pump()
    }

    /// End the bridge session. The peer observes the closed condition.
    pub fn close(&self) {
        self.core.close();
    }

    /// Whether the bridge session is over.
    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}

impl<T: Transport> Drop for ViewEndpoint<T> {
    fn drop(&mut self) {
        self.core.close();
    }
}
