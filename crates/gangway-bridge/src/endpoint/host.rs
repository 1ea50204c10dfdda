//! The host side of the bridge.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, error};

use crate::envelope::{Direction, Message};
use crate::error::{BridgeError, TransportError};
use crate::transport::Transport;

use super::{BridgeConfig, Emitter, EndpointCore};

/// How often the dispatcher thread wakes to observe a close between frames.
const DISPATCH_POLL: Duration = Duration::from_millis(100);

/// The native process's handle to the bridge.
///
/// Mirrors [`ViewEndpoint`](super::ViewEndpoint) with the direction reversed.
/// Hosts that run their own event loop call [`pump`] from it; hosts that
/// don't call [`start_dispatcher`] once and let a worker thread deliver
/// inbound messages. Either way dispatch is sequential: the handler is never
/// invoked concurrently with itself.
///
/// Dropping the endpoint ends the bridge session and joins the dispatcher.
///
/// [`pump`]: HostEndpoint::pump
/// [`start_dispatcher`]: HostEndpoint::start_dispatcher
pub struct HostEndpoint<T: Transport> {
    core: Arc<EndpointCore<T>>,
    dispatcher: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<T: Transport> HostEndpoint<T> {
    /// Create a host endpoint over one half of a transport.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, BridgeConfig::default())
    }

    /// Create a host endpoint with explicit options.
    pub fn with_config(transport: T, config: BridgeConfig) -> Self {
        Self {
            core: Arc::new(EndpointCore::new(transport, Direction::HostToView, config)),
            dispatcher: Mutex::new(None),
        }
    }

    /// Register the callback invoked once per inbound view message.
    /// Overwrites any prior registration; last registration wins.
    pub fn set_inbound_handler(&self, handler: impl FnMut(Message) + Send + 'static) {
        self.core.set_inbound_handler(handler);
    }

    /// Empty the handler slot. Subsequent inbound messages are dropped
    /// without error.
    pub fn clear_inbound_handler(&self) {
        self.core.clear_inbound_handler();
    }

    /// Send a host→view message. Fire-and-forget: the call never blocks and
    /// returns before anything is delivered.
    pub fn emit(&self, message: Message) -> Result<(), BridgeError> {
        self.core.emit(message)
    }

    /// An outbound-only handle for emitting from inside handlers and other
    /// threads.
    pub fn emitter(&self) -> Emitter<T> {
        Emitter::new(Arc::clone(&self.core))
    }

    /// Deliver queued view→host messages to the registered handler, in
    /// arrival order. For hosts integrating the bridge into their own event
    /// loop; do not mix with [`start_dispatcher`](Self::start_dispatcher).
    pub fn pump(&self) -> usize {
        self.core.pump()
    }

    /// End the bridge session. The dispatcher, if running, winds down.
    pub fn close(&self) {
        self.core.close();
    }

    /// Whether the bridge session is over.
    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}

impl<T: Transport + 'static> HostEndpoint<T> {
    /// Spawn the background dispatch thread.
    ///
    /// The thread drains the transport and invokes the inbound handler one
    /// message at a time until the session closes. Idempotent: a second call
    /// is a logged no-op.
    pub fn start_dispatcher(&self) {
        let mut slot = self.dispatcher.lock().unwrap();
        if slot.is_some() {
            debug!("host dispatcher already running");
            return;
        }

        let core = Arc::clone(&self.core);
        match thread::Builder::new()
            .name("gangway-host-dispatch".to_string())
            .spawn(move || dispatch_loop(core))
        {
            Ok(handle) => *slot = Some(handle),
            Err(e) => error!(error = %e, "failed to spawn host dispatcher thread"),
        }
    }
}

fn dispatch_loop<T: Transport>(core: Arc<EndpointCore<T>>) {
    debug!("host dispatcher started");
    loop {
        match core.recv_timeout(DISPATCH_POLL) {
            Ok(Some(frame)) => {
                core.dispatch_one(&frame);
            }
            Ok(None) => {
                if core.is_closed() {
                    break;
                }
            }
            Err(TransportError::Closed) => break,
        }
    }
    debug!("host dispatcher stopped");
}

impl<T: Transport> Drop for HostEndpoint<T> {
    fn drop(&mut self) {
        self.core.close();
        if let Some(handle) = self.dispatcher.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}
