//! Interactive counter demo: a "page" tally mirrored to a host process over
//! the bridge, with the host acknowledging resets back to the page.

mod cli;

use std::time::Duration;

use gangway_bridge::{
    transport::memory, HostEndpoint, Message, MessageRouter, ViewEndpoint,
};
use gangway_counter::{tally_payload, Counter, KIND_COUNTER_RESET, KIND_COUNTER_VALUE};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Wire the host side: a router logging counter traffic, an acknowledgement
/// for resets, and a background dispatcher.
fn wire_host(host_half: memory::MemoryTransport) -> HostEndpoint<memory::MemoryTransport> {
    let host = HostEndpoint::new(host_half);

    let mut router = MessageRouter::new();
    router.on(KIND_COUNTER_VALUE, |payload| match tally_payload(&payload) {
        Some(tally) => info!(tally, "host: counter value"),
        None => warn!("host: counter value with a non-numeric payload"),
    });

    let ack = host.emitter();
    router.on(KIND_COUNTER_RESET, move |_| {
        info!("host: counter reset");
        if let Err(e) = ack.emit(Message::text(
            "host_log",
            "counter reset received on the host side",
        )) {
            warn!(error = %e, "host: reset acknowledgement failed");
        }
    });
    router.set_fallback(|msg| warn!(kind = %msg.kind, "host: unexpected message"));

    host.set_inbound_handler(router.into_handler());
    host.start_dispatcher();
    host
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let directive = args.log_level.as_deref().unwrap_or("gangway=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                directive
                    .parse()
                    .unwrap_or_else(|_| "gangway=info".parse().unwrap()),
            ),
        )
        .init();

    let (mut counter, _host) = if args.detached {
        info!("running detached: no host bridge, the tally stays local");
        (Counter::<memory::MemoryTransport>::detached(), None)
    } else {
        let (host_half, view_half) = memory::pair();
        let host = wire_host(host_half);

        let view = ViewEndpoint::new(view_half);
        view.set_inbound_handler(|msg| {
            info!(kind = %msg.kind, payload = ?msg.payload, "view: message from the host");
        });
        (Counter::embedded(view), Some(host))
    };

    println!("gangway counter demo: [enter]/i increments, r resets, q quits");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                match line.trim() {
                    "" | "i" => {
                        let tally = counter.increment();
                        println!("tally: {tally}");
                    }
                    "r" => {
                        counter.reset();
                        println!("tally: 0");
                    }
                    "q" => break,
                    other => println!("unrecognized input: {other:?}"),
                }

                // Give the host dispatcher a beat, then deliver whatever it
                // queued for the page (reset acknowledgements, logs).
                if let Some(endpoint) = counter.endpoint() {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    endpoint.pump();
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if let Some(endpoint) = counter.endpoint() {
        endpoint.pump();
        endpoint.close();
    }
    info!(tally = counter.tally(), "demo finished");
}
