//! Guards that keep late asynchronous results from landing in stale state.
//!
//! [`MountGuard`] tracks whether the owner of some view state is still
//! alive; [`RequestSequence`] numbers issued requests so only the newest
//! one's result is applied.
//!
//! Neither cancels work. In-flight requests run to completion and callers
//! consult the guard before writing their results.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Liveness flag for a mounted controller.
///
/// Clone-cheap (wraps `Arc`). Unmount once, observe from any clone.
#[derive(Debug, Clone)]
pub struct MountGuard {
    unmounted: Arc<AtomicBool>,
}

impl MountGuard {
    /// Create a guard in the mounted state.
    pub fn new() -> Self {
        Self {
            unmounted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the owner as gone.
    pub fn unmount(&self) {
        self.unmounted.store(true, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        !self.unmounted.load(Ordering::Acquire)
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Ticket handed out by [`RequestSequence::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Monotonic numbering of requests issued by one controller.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket newer than every ticket issued so far.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the most recently issued one.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmount_is_seen_by_every_clone() {
        let guard = MountGuard::new();
        let other = guard.clone();
        assert!(other.is_mounted());

        guard.unmount();
        assert!(!guard.is_mounted());
        assert!(!other.is_mounted());
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let seq = RequestSequence::new();
        let first = seq.begin();
        let second = seq.begin();

        assert!(first < second);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }
}
