//! Scan state machine.
//!
//! `ScanSession` debounces noisy per-frame classifier output into single
//! validated scan events and accumulates a running monetary sum:
//!
//! Ready -> Validating -> Confirmed -> Cooldown -> Ready
//!
//! The session owns its timers. Each timer class has a single handle
//! slot; arming a class cancels the previous instance, and every timer
//! fire is guarded against the state having already moved on.

mod announce;
mod session;

pub use announce::{Announcer, LogAnnouncer};
pub use session::{ScanEvent, ScanSession, ScanState};
