//! In-memory transport: a pair of connected conduit halves.
//!
//! Backs the endpoint tests and the demo binary. Each half owns the sending
//! lane toward its peer and the receiving lane from it; a shared flag makes
//! `close` on either half visible to both at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use tracing::debug;

use super::Transport;
use crate::error::TransportError;

/// One half of an in-memory transport pair.
pub struct MemoryTransport {
    tx: Mutex<mpsc::Sender<Vec<u8>>>,
    rx: Mutex<mpsc::Receiver<Vec<u8>>>,
    closed: Arc<AtomicBool>,
    side: &'static str,
}

/// Create a connected transport pair: `(host half, view half)`.
pub fn pair() -> (MemoryTransport, MemoryTransport) {
    let (host_tx, view_rx) = mpsc::channel();
    let (view_tx, host_rx) = mpsc::channel();
    let closed = Arc::new(AtomicBool::new(false));

    let host = MemoryTransport {
        tx: Mutex::new(host_tx),
        rx: Mutex::new(host_rx),
        closed: Arc::clone(&closed),
        side: "host",
    };
    let view = MemoryTransport {
        tx: Mutex::new(view_tx),
        rx: Mutex::new(view_rx),
        closed,
        side: "view",
    };
    (host, view)
}

impl Transport for MemoryTransport {
    fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        // The lock serializes concurrent senders on this side; the channel
        // then preserves their enqueue order end to end.
        let tx = self.tx.lock().unwrap();
        tx.send(frame).map_err(|_| TransportError::Closed)
    }

    fn try_recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let rx = self.rx.lock().unwrap();
        match rx.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(mpsc::TryRecvError::Empty) => {
                if self.closed.load(Ordering::Acquire) {
                    Err(TransportError::Closed)
                } else {
                    Ok(None)
                }
            }
            Err(mpsc::TryRecvError::Disconnected) => Err(TransportError::Closed),
        }
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        let rx = self.rx.lock().unwrap();
        match rx.recv_timeout(timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if self.closed.load(Ordering::Acquire) {
                    Err(TransportError::Closed)
                } else {
                    Ok(None)
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
        }
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(side = self.side, "transport closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn frames_arrive_in_send_order() {
        let (host, view) = pair();

        view.send(b"one".to_vec()).unwrap();
        view.send(b"two".to_vec()).unwrap();
        view.send(b"three".to_vec()).unwrap();

        assert_eq!(host.try_recv().unwrap(), Some(b"one".to_vec()));
        assert_eq!(host.try_recv().unwrap(), Some(b"two".to_vec()));
        assert_eq!(host.try_recv().unwrap(), Some(b"three".to_vec()));
        assert_eq!(host.try_recv().unwrap(), None);
    }

    #[test]
    fn try_recv_on_idle_conduit_is_none() {
        let (host, _view) = pair();
        assert_eq!(host.try_recv().unwrap(), None);
        assert!(!host.is_closed());
    }

    #[test]
    fn close_is_visible_to_both_halves() {
        let (host, view) = pair();
        view.close();
        assert!(host.is_closed());
        assert!(view.is_closed());

        assert_eq!(host.send(b"late".to_vec()), Err(TransportError::Closed));
        assert_eq!(view.send(b"late".to_vec()), Err(TransportError::Closed));
    }

    #[test]
    fn close_is_idempotent() {
        let (host, view) = pair();
        host.close();
        host.close();
        view.close();
        assert!(host.is_closed());
    }

    #[test]
    fn frames_sent_before_close_are_drained() {
        let (host, view) = pair();
        view.send(b"early".to_vec()).unwrap();
        view.close();

        assert_eq!(host.try_recv().unwrap(), Some(b"early".to_vec()));
        assert_eq!(host.try_recv(), Err(TransportError::Closed));
    }

    #[test]
    fn dropping_a_half_closes_the_conduit() {
        let (host, view) = pair();
        drop(view);
        assert!(host.is_closed());
        assert_eq!(host.send(b"late".to_vec()), Err(TransportError::Closed));
    }

    #[test]
    fn recv_timeout_times_out_on_idle_conduit() {
        let (host, _view) = pair();
        let got = host.recv_timeout(Duration::from_millis(10)).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn recv_timeout_wakes_on_arrival() {
        let (host, view) = pair();
        let sender = thread::spawn(move || {
            view.send(b"wake".to_vec()).unwrap();
            view
        });
        let got = host.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(got, Some(b"wake".to_vec()));
        sender.join().unwrap();
    }

    #[test]
    fn concurrent_senders_never_tear_or_drop_frames() {
        let (host, view) = pair();
        let view = Arc::new(view);

        let mut workers = Vec::new();
        for worker in 0u8..4 {
            let half = Arc::clone(&view);
            workers.push(thread::spawn(move || {
                for i in 0u8..50 {
                    half.send(vec![worker, i]).unwrap();
                }
            }));
        }
        for w in workers {
            w.join().unwrap();
        }

        let mut last_seen = [None::<u8>; 4];
        let mut total = 0;
        while let Some(frame) = host.try_recv().unwrap() {
            assert_eq!(frame.len(), 2, "torn frame: {frame:?}");
            let (worker, i) = (frame[0] as usize, frame[1]);
            // Per-sender order is preserved even with interleaved workers.
            if let Some(prev) = last_seen[worker] {
                assert!(i > prev, "worker {worker} went backwards: {prev} -> {i}");
            }
            last_seen[worker] = Some(i);
            total += 1;
        }
        assert_eq!(total, 200);
    }
}
