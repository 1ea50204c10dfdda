//! Error taxonomy for the bridge.

/// Violations of the self-delimited frame contract.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame body too large: {len} bytes exceeds limit of {max}")]
    TooLarge { len: usize, max: usize },

    #[error("frame truncated: need at least {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    #[error("frame length mismatch: header says {declared}, body is {actual}")]
    LengthMismatch { declared: usize, actual: usize },
}

/// Transport-level failures, surfaced by conduit operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("transport closed: peer endpoint is gone")]
    Closed,
}

/// Failures surfaced to the caller of `emit`.
///
/// Inbound failures are not represented here: a frame that cannot be decoded
/// is logged and dropped by the receiving endpoint, and handler panics are
/// isolated per invocation.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("channel closed: peer endpoint is gone")]
    ChannelClosed,
}

impl From<TransportError> for BridgeError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Closed => BridgeError::ChannelClosed,
        }
    }
}
