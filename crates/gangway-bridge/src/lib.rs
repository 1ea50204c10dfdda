//! Message bridge between a native host process and an embedded content view.
//!
//! Provides:
//! - A typed message envelope (kind + payload) shared by both sides
//! - Self-delimited wire framing for every frame crossing the transport
//! - A `Transport` contract plus an in-memory paired implementation
//! - Host-side and view-side endpoints with ordered, fire-and-forget delivery
//! - A kind-keyed router for payload-discriminated dispatch

pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod router;
pub mod transport;
pub mod wire;

pub use endpoint::{BridgeConfig, ClosedPolicy, Emitter, HostEndpoint, ViewEndpoint};
pub use envelope::{Direction, Message, Payload};
pub use error::{BridgeError, FrameError, TransportError};
pub use router::MessageRouter;
pub use transport::Transport;
