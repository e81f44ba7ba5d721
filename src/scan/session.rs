use std::time::{Duration, Instant};

use crate::catalog::BanknoteCatalog;
use crate::config::ScannerConfig;
use crate::scan::announce::{note_phrase, sum_phrase, Announcer};
use crate::timer::{TimerHandle, TimerKind, TimerService};
use crate::{best_prediction, ClassPrediction};

/// Scan state machine phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    /// Ready to scan a new banknote.
    Ready,
    /// A candidate was seen; waiting for it to stay stable.
    Validating,
    /// The candidate survived the validation window; accumulate on the
    /// next frame.
    Confirmed,
    /// Dead time after a confirmed scan; predictions are ignored.
    Cooldown,
}

/// Outcome of a `process_frame` call that the display boundary can
/// observe without polling session internals.
#[derive(Clone, Debug, PartialEq)]
pub enum ScanEvent {
    /// A banknote was confirmed and added to the sum.
    NoteConfirmed {
        label: String,
        value: u64,
        sum: u64,
    },
    /// The inactivity window elapsed; the sum was announced and cleared.
    SumReset { total: u64 },
}

/// Owned per-session state for the banknote scanner.
///
/// Created at session start, reset on demand, dropped at session end.
/// All durations are wall-clock; the caller supplies `now` on every
/// frame, so the machine never assumes a frame rate.
pub struct ScanSession {
    threshold: f32,
    empty_label: String,
    validate_time: Duration,
    scan_wait_time: Duration,
    sum_reset_time: Duration,
    catalog: BanknoteCatalog,
    announcer: Box<dyn Announcer>,

    state: ScanState,
    candidate: Option<String>,
    sum: u64,
    timers: TimerService,
    validation_timer: Option<TimerHandle>,
    cooldown_timer: Option<TimerHandle>,
    sum_reset_timer: Option<TimerHandle>,
    last_predictions: Vec<ClassPrediction>,
}

impl ScanSession {
    pub fn new(config: &ScannerConfig, announcer: Box<dyn Announcer>) -> Self {
        Self {
            threshold: config.threshold,
            empty_label: config.empty_label.clone(),
            validate_time: config.validate_time,
            scan_wait_time: config.scan_wait_time,
            sum_reset_time: config.sum_reset_time,
            catalog: config.catalog.clone(),
            announcer,
            state: ScanState::Ready,
            candidate: None,
            sum: 0,
            timers: TimerService::new(),
            validation_timer: None,
            cooldown_timer: None,
            sum_reset_timer: None,
            last_predictions: Vec::new(),
        }
    }

    /// Process one frame of classifier output.
    ///
    /// Timers due at `now` fire first, in deadline order, exactly as if
    /// they had run between frames. The returned events describe what
    /// this call did; an empty vec is the common case.
    pub fn process_frame(
        &mut self,
        predictions: &[ClassPrediction],
        now: Instant,
    ) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        for kind in self.timers.drain_due(now) {
            self.on_timer(kind, &mut events);
        }

        self.last_predictions = predictions.to_vec();
        let Some(best) = best_prediction(predictions) else {
            return events;
        };

        match self.state {
            ScanState::Ready => {
                if best.confidence > self.threshold && best.label != self.empty_label {
                    self.candidate = Some(best.label.clone());
                    self.arm_validation(now);
                    self.set_state(ScanState::Validating);
                }
            }
            ScanState::Validating => {
                if self.candidate.as_deref() != Some(best.label.as_str()) {
                    // Unstable candidate: revert without accumulating.
                    log::debug!(
                        "candidate {:?} changed to {:?}, reverting to ready",
                        self.candidate,
                        best.label
                    );
                    self.cancel_validation();
                    self.candidate = None;
                    self.set_state(ScanState::Ready);
                }
            }
            ScanState::Confirmed => {
                self.finish_confirmed(now, &mut events);
            }
            ScanState::Cooldown => {}
        }

        events
    }

    /// Accumulate the confirmed candidate and enter cooldown.
    ///
    /// Runs on the first frame processed in `Confirmed`; the frame's own
    /// predictions play no part, only the validated candidate does.
    fn finish_confirmed(&mut self, now: Instant, events: &mut Vec<ScanEvent>) {
        let Some(label) = self.candidate.clone() else {
            log::warn!("confirmed state without a candidate, reverting to ready");
            self.set_state(ScanState::Ready);
            return;
        };

        let value = self.catalog.value_of(&label);
        if value == 0 {
            // The original logic left the machine stuck here with no
            // cooldown armed. Revert instead so scanning can continue.
            log::warn!(
                "confirmed label {:?} has no catalog value, reverting to ready",
                label
            );
            self.candidate = None;
            self.set_state(ScanState::Ready);
            return;
        }

        self.cancel_sum_reset();
        self.sum += value;
        log::info!("banknote confirmed: {} ({}) - sum {}", label, value, self.sum);
        self.announcer.speak(&note_phrase(value));

        self.arm_cooldown(now);
        if self.sum > 0 {
            self.arm_sum_reset(now);
        }
        self.set_state(ScanState::Cooldown);
        events.push(ScanEvent::NoteConfirmed {
            label,
            value,
            sum: self.sum,
        });
    }

    /// State-guarded timer dispatch. A timer firing after its originating
    /// state already moved on is stale and must be ignored.
    fn on_timer(&mut self, kind: TimerKind, events: &mut Vec<ScanEvent>) {
        match kind {
            TimerKind::Validation => {
                self.validation_timer = None;
                if self.state == ScanState::Validating {
                    self.set_state(ScanState::Confirmed);
                } else {
                    log::warn!("stale validation timer in {:?}, ignoring", self.state);
                }
            }
            TimerKind::Cooldown => {
                self.cooldown_timer = None;
                if self.state == ScanState::Cooldown {
                    self.candidate = None;
                    self.set_state(ScanState::Ready);
                } else {
                    log::warn!("stale cooldown timer in {:?}, ignoring", self.state);
                }
            }
            TimerKind::SumReset => {
                self.sum_reset_timer = None;
                if self.sum > 0 {
                    let total = self.sum;
                    log::info!("no scans for {:?}, clearing sum of {}", self.sum_reset_time, total);
                    self.announcer.speak(&sum_phrase(total));
                    self.sum = 0;
                    events.push(ScanEvent::SumReset { total });
                }
            }
        }
    }

    /// Restore the session to its start-of-session state: ready, sum 0,
    /// no candidate, no pending timers.
    pub fn reset(&mut self) {
        self.timers.clear();
        self.validation_timer = None;
        self.cooldown_timer = None;
        self.sum_reset_timer = None;
        self.candidate = None;
        self.sum = 0;
        self.last_predictions.clear();
        self.set_state(ScanState::Ready);
    }

    // -------------------- Timer slots --------------------
    //
    // One owned slot per timer class; arming cancels the previous
    // instance so duplicate transitions cannot be scheduled.

    fn arm_validation(&mut self, now: Instant) {
        self.cancel_validation();
        self.validation_timer =
            Some(self.timers.schedule(TimerKind::Validation, self.validate_time, now));
    }

    fn cancel_validation(&mut self) {
        if let Some(handle) = self.validation_timer.take() {
            self.timers.cancel(handle);
        }
    }

    fn arm_cooldown(&mut self, now: Instant) {
        if let Some(handle) = self.cooldown_timer.take() {
            self.timers.cancel(handle);
        }
        self.cooldown_timer =
            Some(self.timers.schedule(TimerKind::Cooldown, self.scan_wait_time, now));
    }

    fn arm_sum_reset(&mut self, now: Instant) {
        self.cancel_sum_reset();
        self.sum_reset_timer =
            Some(self.timers.schedule(TimerKind::SumReset, self.sum_reset_time, now));
    }

    fn cancel_sum_reset(&mut self) {
        if let Some(handle) = self.sum_reset_timer.take() {
            self.timers.cancel(handle);
        }
    }

    fn set_state(&mut self, next: ScanState) {
        if self.state != next {
            log::debug!("scan state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    // -------------------- Display boundary --------------------

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Accumulated sum in whole dollars.
    pub fn sum(&self) -> u64 {
        self.sum
    }

    /// Predictions from the most recent frame, for label rendering.
    pub fn latest_predictions(&self) -> &[ClassPrediction] {
        &self.last_predictions
    }

    pub fn candidate(&self) -> Option<&str> {
        self.candidate.as_deref()
    }

    /// Pending sum-reset timers; at most one by construction.
    pub fn pending_sum_resets(&self) -> usize {
        self.timers.pending_count(TimerKind::SumReset)
    }
}
