//! Single-threaded cancellable one-shot timers.
//!
//! The scan state machine runs on one logical thread; timers never fire
//! concurrently with frame processing. The driver calls `drain_due`
//! between frames and delivers the fired kinds back to the session.
//!
//! Cancellation is idempotent: cancelling a handle that already fired or
//! was already cancelled is a no-op.

use std::time::{Duration, Instant};

/// Timer classes armed by the scan session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Candidate stability window before a scan is confirmed.
    Validation,
    /// Post-confirmation dead time before the scanner can scan again.
    Cooldown,
    /// Inactivity window after which the accumulated sum is announced and cleared.
    SumReset,
}

/// Owned handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct TimerEntry {
    id: u64,
    kind: TimerKind,
    deadline: Instant,
}

/// Deterministic one-shot timer queue.
#[derive(Debug, Default)]
pub struct TimerService {
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl TimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot timer firing `delay` after `now`.
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration, now: Instant) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(TimerEntry {
            id,
            kind,
            deadline: now + delay,
        });
        TimerHandle(id)
    }

    /// Cancel a timer. No-op if the handle already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|entry| entry.id != handle.0);
    }

    /// Remove and return all timers due at `now`, in deadline order.
    ///
    /// Deadline ties fire in scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due: Vec<TimerEntry> = Vec::new();
        self.entries.retain(|entry| {
            if entry.deadline <= now {
                due.push(entry.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.id.cmp(&b.id)));
        due.into_iter().map(|entry| entry.kind).collect()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|entry| entry.id == handle.0)
    }

    /// Number of pending timers of one kind.
    pub fn pending_count(&self, kind: TimerKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    /// Drop all pending timers.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
