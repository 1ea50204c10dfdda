//! Kind-keyed dispatch over the single inbound handler slot.
//!
//! The bridge delivers every inbound message to one handler. Applications
//! that speak several payload-discriminated message kinds install a router
//! as that handler and register one callback per kind, the way a page
//! exposes one named global function per command.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::envelope::{Message, Payload};

type RouteFn = Box<dyn FnMut(Payload) + Send>;
type FallbackFn = Box<dyn FnMut(Message) + Send>;

/// Routes inbound messages to named callbacks by message kind.
#[derive(Default)]
pub struct MessageRouter {
    routes: HashMap<String, RouteFn>,
    fallback: Option<FallbackFn>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the callback for one message kind, receiving that message's
    /// payload. The last registration for a kind wins.
    pub fn on(&mut self, kind: impl Into<String>, callback: impl FnMut(Payload) + Send + 'static) {
        self.routes.insert(kind.into(), Box::new(callback));
    }

    /// Unregister the callback for a kind. Returns whether one was present.
    pub fn remove(&mut self, kind: &str) -> bool {
        self.routes.remove(kind).is_some()
    }

    /// Install a catch-all invoked with the whole message for kinds with no
    /// registered route.
    pub fn set_fallback(&mut self, callback: impl FnMut(Message) + Send + 'static) {
        self.fallback = Some(Box::new(callback));
    }

    /// Kinds with a registered route.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Route one message by kind. Unrouted kinds go to the fallback, or are
    /// logged and dropped.
    pub fn dispatch(&mut self, message: Message) {
        if let Some(route) = self.routes.get_mut(&message.kind) {
            debug!(kind = %message.kind, "message routed");
            route(message.payload);
        } else if let Some(fallback) = &mut self.fallback {
            fallback(message);
        } else {
            warn!(kind = %message.kind, "message dropped: no route registered");
        }
    }

    /// Convert the router into a closure installable with
    /// `set_inbound_handler`.
    pub fn into_handler(mut self) -> impl FnMut(Message) + Send {
        move |message| self.dispatch(message)
    }
}
