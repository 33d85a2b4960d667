//! Fuzz target for the connectivity manager's pending queue
//!
//! Random sends, outages and activations over the in-memory link. Once both
//! sides end activated and every event is delivered, nothing may be left
//! queued.

#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use tandem_core::{
    ActivationState, ConnectivityManager, SendOptions, SessionEvent,
    memory::{MemoryLink, MemorySession},
};
use tandem_proto::{Messageable, Mode};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Arbitrary)]
enum Op {
    SendMode { queue: bool },
    SendData { queue: bool, len: u8 },
    Activate,
    Deactivate,
    Reachable(bool),
    Deliver,
}

fn options<T>(queue: bool) -> SendOptions<T> {
    if queue { SendOptions::default().queue_if_necessary() } else { SendOptions::default() }
}

fn deliver(
    manager: &ConnectivityManager<MemorySession>,
    events: &mut UnboundedReceiver<SessionEvent>,
) {
    while let Ok(event) = events.try_recv() {
        manager.handle_event(event);
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let (host, mut companion) = MemoryLink::pair();
    let Ok(manager) = ConnectivityManager::new(host.session) else {
        return;
    };
    let mut events = host.events;

    for op in ops {
        match op {
            Op::SendMode { queue } => {
                let _ = manager.send(Mode::Primary.to_message(), options(queue));
            },
            Op::SendData { queue, len } => {
                let _ = manager.send_data(Bytes::from(vec![0u8; usize::from(len)]), options(queue));
            },
            Op::Activate => {
                manager.transport().complete_activation(ActivationState::Activated);
            },
            Op::Deactivate => manager.transport().deactivate(),
            Op::Reachable(reachable) => manager.transport().set_reachable(reachable),
            Op::Deliver => deliver(&manager, &mut events),
        }
        while companion.events.try_recv().is_ok() {}
    }

    manager.transport().set_reachable(true);
    manager.transport().complete_activation(ActivationState::Activated);
    deliver(&manager, &mut events);

    assert_eq!(manager.pending_len(), 0);
});
