//! Stand-ins for the outside world: a recording transmitter and a JSON file
//! state store.
pub mod error;
pub mod store;

pub use store::FileStateStore;

use shade_traits::Transmitter;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::HwError;

/// Shared view of what a `SimulatedTransmitter` has put on the air.
#[derive(Debug, Clone, Default)]
pub struct SimLink {
    sent: Rc<RefCell<Vec<String>>>,
    unreachable: Rc<Cell<bool>>,
    timing_out: Rc<Cell<bool>>,
}

impl SimLink {
    /// Payloads delivered so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.borrow().len()
    }

    /// True when every payload in `codes` was delivered at least once.
    pub fn has_sent(&self, codes: &[&str]) -> bool {
        let sent = self.sent.borrow();
        codes.iter().all(|c| sent.iter().any(|s| s == c))
    }

    /// Make subsequent transmissions fail as if the blaster were offline.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.set(unreachable);
    }

    /// Make subsequent transmissions time out without an acknowledgement.
    pub fn set_timing_out(&self, timing_out: bool) {
        self.timing_out.set(timing_out);
    }
}

/// Simulated IR/RF blaster that records every delivered payload.
pub struct SimulatedTransmitter {
    link: SimLink,
    echo: bool,
}

impl SimulatedTransmitter {
    pub fn new() -> Self {
        SimulatedTransmitter {
            link: SimLink::default(),
            echo: false,
        }
    }

    /// A transmitter whose link is already unreachable.
    pub fn failing() -> Self {
        let tx = Self::new();
        tx.link.set_unreachable(true);
        tx
    }

    /// Log each delivered payload at info level.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Handle for inspecting deliveries after the transmitter is moved away.
    pub fn link(&self) -> SimLink {
        self.link.clone()
    }
}

impl Default for SimulatedTransmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Transmitter for SimulatedTransmitter {
    fn transmit(&mut self, payload: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.link.unreachable.get() {
            return Err(Box::new(HwError::Unreachable("simulated link down".into())));
        }
        if self.link.timing_out.get() {
            return Err(Box::new(HwError::Timeout));
        }
        if self.echo {
            tracing::info!(payload, "transmit (simulated)");
        }
        self.link.sent.borrow_mut().push(payload.to_string());
        Ok(())
    }
}
