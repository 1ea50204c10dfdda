//! Bridge endpoints: one handle per side of the bridge.
//!
//! Both endpoints share the same core: a single replaceable inbound-handler
//! slot, an `emit` that serializes and hands one frame to the transport
//! without blocking, and a sequential dispatch pump that isolates handler
//! panics per invocation.

mod host;
mod view;

pub use host::HostEndpoint;
pub use view::ViewEndpoint;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::envelope::{Direction, Message};
use crate::error::{BridgeError, TransportError};
use crate::transport::Transport;
use crate::wire;

/// Behavior of `emit` once the bridge session is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosedPolicy {
    /// `emit` returns [`BridgeError::ChannelClosed`].
    #[default]
    Error,
    /// `emit` is a silent no-op; the message is dropped.
    Drop,
}

/// Construction-time options for a bridge endpoint.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Upper bound for one encoded message body, in bytes.
    pub max_frame_len: usize,
    /// What `emit` does after the peer endpoint is gone.
    pub on_closed: ClosedPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_frame_len: wire::DEFAULT_MAX_FRAME_LEN,
            on_closed: ClosedPolicy::default(),
        }
    }
}

type InboundHandler = Box<dyn FnMut(Message) + Send>;

/// The single inbound-handler slot. The generation counter tells a dispatch
/// in flight whether the slot changed under it (re-registration wins).
#[derive(Default)]
struct HandlerSlot {
    handler: Option<InboundHandler>,
    generation: u64,
}

/// Shared endpoint internals: transport half, handler slot, dispatch guard.
pub(crate) struct EndpointCore<T: Transport> {
    transport: T,
    outbound: Direction,
    slot: Mutex<HandlerSlot>,
    /// Held across a dispatch so handler invocations on this endpoint are
    /// mutually exclusive.
    dispatch: Mutex<()>,
    config: BridgeConfig,
}

impl<T: Transport> EndpointCore<T> {
    pub(crate) fn new(transport: T, outbound: Direction, config: BridgeConfig) -> Self {
        Self {
            transport,
            outbound,
            slot: Mutex::new(HandlerSlot::default()),
            dispatch: Mutex::new(()),
            config,
        }
    }

    /// Register the inbound handler. Last registration wins; replacing a
    /// handler is not an error.
    pub(crate) fn set_inbound_handler(&self, handler: impl FnMut(Message) + Send + 'static) {
        let mut slot = self.slot.lock().unwrap();
        slot.handler = Some(Box::new(handler));
        slot.generation += 1;
    }

    /// Empty the handler slot. Subsequent inbound messages are dropped.
    pub(crate) fn clear_inbound_handler(&self) {
        let mut slot = self.slot.lock().unwrap();
        slot.handler = None;
        slot.generation += 1;
    }

    /// Encode one message into a frame and enqueue it for the peer. Never
    /// blocks; delivery is fire-and-forget.
    pub(crate) fn emit(&self, message: Message) -> Result<(), BridgeError> {
        let body = serde_json::to_vec(&message)?;
        let frame = wire::encode_frame(&body, self.config.max_frame_len)?;

        match self.transport.send(frame) {
            Ok(()) => Ok(()),
            Err(TransportError::Closed) => match self.config.on_closed {
                ClosedPolicy::Error => Err(BridgeError::ChannelClosed),
                ClosedPolicy::Drop => {
                    debug!(
                        direction = self.outbound.label(),
                        kind = %message.kind,
                        "emit after close dropped"
                    );
                    Ok(())
                }
            },
        }
    }

    /// Drain all queued inbound frames, invoking the handler once per message
    /// in arrival order. Returns the number of messages handed to a handler.
    ///
    /// Not reentrant: a handler must not call `pump` on its own endpoint.
    pub(crate) fn pump(&self) -> usize {
        let _guard = self.dispatch.lock().unwrap();
        let mut dispatched = 0;
        while let Ok(Some(frame)) = self.transport.try_recv() {
            if self.dispatch_frame(&frame) {
                dispatched += 1;
            }
        }
        dispatched
    }

    /// Dispatch a single received frame under the dispatch guard.
    pub(crate) fn dispatch_one(&self, frame: &[u8]) -> bool {
        let _guard = self.dispatch.lock().unwrap();
        self.dispatch_frame(frame)
    }

    /// Decode one frame and invoke the handler. Callers hold the dispatch
    /// guard. Returns whether a handler was invoked.
    fn dispatch_frame(&self, frame: &[u8]) -> bool {
        let inbound = self.outbound.reversed();

        let body = match wire::decode_frame(frame, self.config.max_frame_len) {
            Ok(body) => body,
            Err(e) => {
                warn!(direction = inbound.label(), error = %e, "inbound frame rejected");
                return false;
            }
        };

        let message: Message = match serde_json::from_slice(body) {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    direction = inbound.label(),
                    error = %e,
                    "inbound message rejected: failed to decode"
                );
                return false;
            }
        };

        // Take the handler out of the slot for the duration of the call, so
        // the handler itself may re-register or emit on this endpoint.
        let (mut handler, generation) = {
            let mut slot = self.slot.lock().unwrap();
            match slot.handler.take() {
                Some(handler) => (handler, slot.generation),
                None => {
                    debug!(
                        direction = inbound.label(),
                        kind = %message.kind,
                        "inbound message dropped: no handler registered"
                    );
                    return false;
                }
            }
        };

        let kind = message.kind.clone();
        debug!(direction = inbound.label(), kind = %kind, "message dispatched");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(message)));
        if outcome.is_err() {
            warn!(
                direction = inbound.label(),
                kind = %kind,
                "inbound handler panicked; endpoint continues"
            );
        }

        // Put the handler back unless the invocation touched the slot; a
        // registration or clear made during dispatch wins.
        let mut slot = self.slot.lock().unwrap();
        if slot.generation == generation {
            slot.handler = Some(handler);
        }
        true
    }

    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        self.transport.recv_timeout(timeout)
    }

    pub(crate) fn close(&self) {
        self.transport.close();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }
}

/// Cheap outbound-only handle to an endpoint.
///
/// Cloneable into inbound handlers and worker threads, so one side can answer
/// messages on the same endpoint that received them.
pub struct Emitter<T: Transport> {
    core: Arc<EndpointCore<T>>,
}

impl<T: Transport> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Transport> Emitter<T> {
    pub(crate) fn new(core: Arc<EndpointCore<T>>) -> Self {
        Self { core }
    }

    /// Send a message in this endpoint's outbound direction.
    pub fn emit(&self, message: Message) -> Result<(), BridgeError> {
        self.core.emit(message)
    }

    /// Whether the bridge session is over.
    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}
