//! In-flight acquisition guard.
//!
//! Overlapping triggers (re-entrant UI lifecycle events) must not issue
//! redundant network calls, and an acquisition whose caller context is gone
//! must not apply any state. The guard hands out generation tickets: a
//! ticket that outlives an `abandon` is stale, and stale completions are
//! discarded entirely.

use std::sync::Mutex;

#[derive(Default)]
struct GuardState {
    in_flight: bool,
    generation: u64,
}

#[derive(Default)]
pub struct AcquisitionGuard {
    state: Mutex<GuardState>,
}

/// Proof of a claimed acquisition slot.
pub struct Ticket {
    generation: u64,
}

impl AcquisitionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot. `None` means an acquisition is already in flight.
    pub fn begin(&self) -> Option<Ticket> {
        let mut state = self.state.lock().unwrap();
        if state.in_flight {
            return None;
        }
        state.in_flight = true;
        Some(Ticket {
            generation: state.generation,
        })
    }

    /// Marks the caller context gone. Any in-flight ticket becomes stale and
    /// a new acquisition may start.
    pub fn abandon(&self) {
        let mut state = self.state.lock().unwrap();
        state.generation += 1;
        state.in_flight = false;
    }

    /// Releases the slot. Returns `false` when `ticket` was superseded by
    /// `abandon`; the caller must then discard the acquisition's results.
    pub fn complete(&self, ticket: &Ticket) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.generation != ticket.generation {
            return false;
        }
        state.in_flight = false;
        true
    }
}
