//! Keypress counter mirrored over the bridge.
//!
//! The reference application for `gangway-bridge`: the view side keeps a
//! local tally, bumps it on a designated key, and mirrors every change to
//! the host as payload-discriminated messages on the one bridge channel.

use gangway_bridge::{Message, Payload, Transport, ViewEndpoint};
use serde_json::json;
use tracing::debug;

/// Kind emitted on every increment; the payload is the new tally.
pub const KIND_COUNTER_VALUE: &str = "counter_value";
/// Kind emitted on reset; the payload is always 0.
pub const KIND_COUNTER_RESET: &str = "counter_reset";

/// The view-side counter state machine.
///
/// Owns its tally outright; the bridge is an explicit optional dependency.
/// A detached counter (page not embedded in any host) keeps full local
/// behavior and skips the mirror emits.
pub struct Counter<T: Transport> {
    tally: u64,
    bridge: Option<ViewEndpoint<T>>,
}

impl<T: Transport> Counter<T> {
    /// A counter with no host bridge.
    pub fn detached() -> Self {
        Self {
            tally: 0,
            bridge: None,
        }
    }

    /// A counter mirrored to the host through `endpoint`.
    pub fn embedded(endpoint: ViewEndpoint<T>) -> Self {
        Self {
            tally: 0,
            bridge: Some(endpoint),
        }
    }

    /// Current tally.
    pub fn tally(&self) -> u64 {
        self.tally
    }

    /// Whether a host bridge is attached.
    pub fn is_embedded(&self) -> bool {
        self.bridge.is_some()
    }

    /// Borrow the attached endpoint, if any, e.g. to pump host messages.
    pub fn endpoint(&self) -> Option<&ViewEndpoint<T>> {
        self.bridge.as_ref()
    }

    /// Bump the tally and mirror the new value to the host.
    pub fn increment(&mut self) -> u64 {
        self.tally += 1;
        self.mirror(Message::json(KIND_COUNTER_VALUE, json!(self.tally)));
        self.tally
    }

    /// Clear the tally and tell the host.
    pub fn reset(&mut self) -> u64 {
        self.tally = 0;
        self.mirror(Message::json(KIND_COUNTER_RESET, json!(self.tally)));
        self.tally
    }

    // Mirror emits are fire-and-forget: a failed emit never disturbs the
    // tally, and a detached counter skips the emit entirely.
    fn mirror(&self, message: Message) {
        let Some(endpoint) = &self.bridge else { return };
        if let Err(e) = endpoint.emit(message) {
            debug!(error = %e, "counter mirror emit dropped");
        }
    }
}

/// Decode the tally carried by a counter message, on the host side.
pub fn tally_payload(payload: &Payload) -> Option<u64> {
    payload.as_value().and_then(serde_json::Value::as_u64)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use gangway_bridge::{transport::memory, HostEndpoint, MessageRouter};

    use super::*;

    type TallyLog = Arc<Mutex<Vec<(String, u64)>>>;

    /// A counter wired to a host endpoint whose handler logs
    /// `(kind, tally)` pairs in arrival order.
    fn mirrored_counter() -> (
        Counter<memory::MemoryTransport>,
        HostEndpoint<memory::MemoryTransport>,
        TallyLog,
    ) {
        let (host_half, view_half) = memory::pair();
        let host = HostEndpoint::new(host_half);

        let log: TallyLog = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        host.set_inbound_handler(move |msg| {
            let tally = tally_payload(&msg.payload).expect("counter payload is a tally");
            sink.lock().unwrap().push((msg.kind, tally));
        });

        let counter = Counter::embedded(ViewEndpoint::new(view_half));
        (counter, host, log)
    }

    #[test]
    fn starts_idle_at_zero() {
        let counter = Counter::<memory::MemoryTransport>::detached();
        assert_eq!(counter.tally(), 0);
        assert!(!counter.is_embedded());
    }

    #[test]
    fn detached_increment_updates_tally_without_raising() {
        let mut counter = Counter::<memory::MemoryTransport>::detached();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.reset(), 0);
        assert_eq!(counter.tally(), 0);
    }

    #[test]
    fn increment_mirrors_each_new_value() {
        let (mut counter, host, log) = mirrored_counter();

        counter.increment();
        counter.increment();
        counter.increment();
        host.pump();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (KIND_COUNTER_VALUE.to_string(), 1),
                (KIND_COUNTER_VALUE.to_string(), 2),
                (KIND_COUNTER_VALUE.to_string(), 3),
            ]
        );
    }

    #[test]
    fn reset_then_double_increment() {
        let (mut counter, host, log) = mirrored_counter();

        counter.reset();
        counter.increment();
        counter.increment();
        host.pump();

        assert_eq!(counter.tally(), 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (KIND_COUNTER_RESET.to_string(), 0),
                (KIND_COUNTER_VALUE.to_string(), 1),
                (KIND_COUNTER_VALUE.to_string(), 2),
            ]
        );
    }

    #[test]
    fn host_log_reads_one_two_zero() {
        // The view emits value(1), value(2), reset(0); the host handler log
        // must read [1, 2, 0].
        let (mut counter, host, log) = mirrored_counter();

        counter.increment();
        counter.increment();
        counter.reset();
        host.pump();

        let tallies: Vec<u64> = log.lock().unwrap().iter().map(|(_, n)| *n).collect();
        assert_eq!(tallies, vec![1, 2, 0]);
    }

    #[test]
    fn increment_keeps_counting_after_the_host_detaches() {
        let (mut counter, host, log) = mirrored_counter();

        counter.increment();
        host.pump();
        host.close();

        // The session is over; the tally is unaffected by the dead bridge.
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.increment(), 3);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn host_routes_counter_kinds_and_acknowledges_reset() {
        let (host_half, view_half) = memory::pair();
        let host = HostEndpoint::new(host_half);
        let view = ViewEndpoint::new(view_half);

        let values: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
        let mut router = MessageRouter::new();
        let sink = Arc::clone(&values);
        router.on(KIND_COUNTER_VALUE, move |payload| {
            sink.lock().unwrap().push(tally_payload(&payload).unwrap());
        });
        let ack = host.emitter();
        router.on(KIND_COUNTER_RESET, move |_| {
            ack.emit(Message::text("host_log", "counter reset received on the host side"))
                .unwrap();
        });
        host.set_inbound_handler(router.into_handler());

        let page_log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&page_log);
        view.set_inbound_handler(move |msg| {
            sink.lock().unwrap().push(msg.payload.as_text().unwrap_or_default().to_string());
        });

        let mut counter = Counter::embedded(view);
        counter.increment();
        counter.reset();

        host.pump();
        if let Some(endpoint) = counter.endpoint() {
            endpoint.pump();
        }

        assert_eq!(*values.lock().unwrap(), vec![1]);
        assert_eq!(
            *page_log.lock().unwrap(),
            vec!["counter reset received on the host side".to_string()]
        );
    }

    #[test]
    fn tally_payload_rejects_non_numeric_payloads() {
        assert_eq!(tally_payload(&Payload::Json(serde_json::json!(5))), Some(5));
        assert_eq!(tally_payload(&Payload::Json(serde_json::json!(-1))), None);
        assert_eq!(tally_payload(&Payload::Text("5".into())), None);
        assert_eq!(tally_payload(&Payload::None), None);
    }
}
