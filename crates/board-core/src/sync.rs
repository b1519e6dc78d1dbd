//! Guard against superseded reads overwriting newer display state
//!
//! Every fetch takes a ticket from a [`FetchSequencer`] before it starts.
//! When the response arrives it is offered to a [`Latest`] slot, which keeps
//! it only if no newer ticket has already been displayed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Ticket for one fetch; later tickets compare greater
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Hands out monotonically increasing fetch tickets
#[derive(Debug, Default)]
pub struct FetchSequencer {
    next: AtomicU64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch
    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// The most recent value accepted for display
#[derive(Debug)]
pub struct Latest<T> {
    slot: Mutex<Option<(FetchTicket, T)>>,
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T: Clone> Latest<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a fetched value; returns false if a newer one is already shown
    pub fn offer(&self, ticket: FetchTicket, value: T) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some((current, _)) if *current >= ticket => {
                debug!(
                    "Dropped stale response {} (showing {})",
                    ticket.generation(),
                    current.generation()
                );
                false
            }
            _ => {
                *slot = Some((ticket, value));
                true
            }
        }
    }

    /// The value currently shown
    pub fn get(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(_, value)| value.clone())
    }

    /// Ticket of the value currently shown
    pub fn ticket(&self) -> Option<FetchTicket> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(ticket, _)| *ticket)
    }
}
