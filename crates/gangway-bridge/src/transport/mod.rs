//! Transport conduits connecting the two bridge endpoints.
//!
//! A transport moves whole frames, in order, between the host side and the
//! view side. It is the only object the two sides share; everything else
//! about the hosting runtime stays opaque to the bridge.

use std::time::Duration;

use crate::error::TransportError;

pub mod memory;

/// One side's handle to the conduit between the two bridge endpoints.
///
/// Contract:
/// - Frames reach the peer in `send` order (FIFO per direction; no ordering
///   across directions).
/// - Concurrent `send` calls from one side are serialized; a frame is never
///   interleaved with another or torn.
/// - After either side closes, `send` fails with [`TransportError::Closed`].
///   Frames sent before the close may still be drained by the surviving
///   side; a frame rejected by `send` is never delivered.
pub trait Transport: Send + Sync {
    /// Enqueue one whole frame for the peer. Never blocks the caller.
    fn send(&self, frame: Vec<u8>) -> Result<(), TransportError>;

    /// Pop the next inbound frame without blocking.
    ///
    /// `Ok(None)` means nothing is queued right now. [`TransportError::Closed`]
    /// means the conduit is closed and fully drained.
    fn try_recv(&self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Pop the next inbound frame, waiting up to `timeout` for one to arrive.
    ///
    /// `Ok(None)` on timeout. Used by worker-thread dispatch loops.
    fn recv_timeout(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError>;

    /// Close the conduit in both directions. Idempotent.
    fn close(&self);

    /// Whether either side has closed the conduit.
    fn is_closed(&self) -> bool;
}
