use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cashscan::{
    Announcer, ClassPrediction, ScanEvent, ScanSession, ScanState, ScannerConfig,
};

const LABELS: &[&str] = &[
    "empty",
    "oneDollar",
    "fiveDollar",
    "tenDollar",
    "twentyDollar",
    "fiftyDollar",
    "hundredDollar",
];

/// Announcer that records every utterance for assertions.
#[derive(Clone, Default)]
struct RecordingAnnouncer {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl Announcer for RecordingAnnouncer {
    fn speak(&mut self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}

struct Harness {
    session: ScanSession,
    spoken: Arc<Mutex<Vec<String>>>,
    base: Instant,
}

impl Harness {
    fn new() -> Self {
        let announcer = RecordingAnnouncer::default();
        let spoken = announcer.spoken.clone();
        Self {
            session: ScanSession::new(&ScannerConfig::default(), Box::new(announcer)),
            spoken,
            base: Instant::now(),
        }
    }

    /// Process one frame at `ms` after session start, with `hot` carrying
    /// `confidence` and the rest of the fixed label set near zero.
    fn frame(&mut self, ms: u64, hot: &str, confidence: f32) -> Vec<ScanEvent> {
        let predictions = predictions_for(hot, confidence);
        self.session
            .process_frame(&predictions, self.base + Duration::from_millis(ms))
    }

    /// Feed frames every 100ms over `[from_ms, to_ms]`, inclusive.
    fn frames(&mut self, from_ms: u64, to_ms: u64, hot: &str, confidence: f32) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        let mut at = from_ms;
        while at <= to_ms {
            events.extend(self.frame(at, hot, confidence));
            at += 100;
        }
        events
    }

    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

fn predictions_for(hot: &str, confidence: f32) -> Vec<ClassPrediction> {
    let mut predictions: Vec<ClassPrediction> = LABELS
        .iter()
        .map(|label| ClassPrediction::new(*label, 0.001))
        .collect();
    match predictions.iter_mut().find(|p| p.label == hot) {
        Some(prediction) => prediction.confidence = confidence,
        // Labels outside the fixed set model a classifier class the
        // catalog does not know about.
        None => predictions.push(ClassPrediction::new(hot, confidence)),
    }
    predictions
}

// -------------------- Ready gating --------------------

#[test]
fn ready_requires_confidence_strictly_above_threshold() {
    let mut h = Harness::new();

    h.frame(0, "oneDollar", 0.95);
    assert_eq!(h.session.state(), ScanState::Ready);

    h.frame(100, "oneDollar", 0.9501);
    assert_eq!(h.session.state(), ScanState::Validating);
    assert_eq!(h.session.candidate(), Some("oneDollar"));
}

#[test]
fn ready_ignores_confident_empty_class() {
    let mut h = Harness::new();

    h.frames(0, 3000, "empty", 0.99);
    assert_eq!(h.session.state(), ScanState::Ready);
    assert_eq!(h.session.sum(), 0);
    assert!(h.spoken().is_empty());
}

// -------------------- Validation window --------------------

#[test]
fn stable_candidate_confirms_after_validation_window() {
    let mut h = Harness::new();

    h.frames(0, 1900, "oneDollar", 0.97);
    assert_eq!(h.session.state(), ScanState::Validating);
    assert_eq!(h.session.sum(), 0);

    // The validation timer fires at 2000ms; the same frame then runs the
    // confirmed transition.
    let events = h.frame(2000, "oneDollar", 0.97);
    assert_eq!(h.session.state(), ScanState::Cooldown);
    assert_eq!(h.session.sum(), 1);
    assert_eq!(
        events,
        vec![ScanEvent::NoteConfirmed {
            label: "oneDollar".to_string(),
            value: 1,
            sum: 1,
        }]
    );
}

#[test]
fn matching_label_with_low_confidence_does_not_revert() {
    // Validation only watches the label; confidence dips are tolerated.
    let mut h = Harness::new();

    h.frame(0, "tenDollar", 0.97);
    h.frame(500, "tenDollar", 0.40);
    assert_eq!(h.session.state(), ScanState::Validating);
}

// -------------------- Scenario A --------------------

#[test]
fn scenario_a_one_dollar_held_for_validation_window() {
    let mut h = Harness::new();

    h.frames(0, 2100, "oneDollar", 0.97);

    assert_eq!(h.session.sum(), 1);
    assert_eq!(h.session.state(), ScanState::Cooldown);
    assert_eq!(h.spoken(), vec!["1 dollar".to_string()]);
}

// -------------------- Scenario B --------------------

#[test]
fn scenario_b_label_change_during_validation_reverts() {
    let mut h = Harness::new();

    h.frame(0, "oneDollar", 0.97);
    assert_eq!(h.session.state(), ScanState::Validating);

    h.frame(500, "fiveDollar", 0.97);
    assert_eq!(h.session.state(), ScanState::Ready);
    assert_eq!(h.session.sum(), 0);
    assert_eq!(h.session.candidate(), None);

    // The cancelled validation timer must not fire later.
    h.frame(2100, "empty", 0.99);
    assert_eq!(h.session.state(), ScanState::Ready);
    assert_eq!(h.session.sum(), 0);
    assert!(h.spoken().is_empty());
}

// -------------------- Scenario C --------------------

#[test]
fn scenario_c_two_scans_within_sum_window_accumulate() {
    let mut h = Harness::new();

    // First ten confirms at 2000ms, then cooldown until 7000ms.
    h.frames(0, 2000, "tenDollar", 0.97);
    assert_eq!(h.session.sum(), 10);
    h.frames(2100, 7000, "empty", 0.99);
    assert_eq!(h.session.state(), ScanState::Ready);

    // Second ten confirms at 9100ms, > SCAN_WAIT_TIME after the first.
    h.frames(7100, 9100, "tenDollar", 0.97);
    assert_eq!(h.session.sum(), 20);
    assert_eq!(h.session.pending_sum_resets(), 1);
    assert_eq!(
        h.spoken(),
        vec!["10 dollars".to_string(), "10 dollars".to_string()]
    );

    // The first scan's reset window (would end at 22000ms) was cancelled
    // by the second scan.
    h.frame(22500, "empty", 0.99);
    assert_eq!(h.session.sum(), 20);

    // The restarted window ends 20s after the second confirm.
    let events = h.frame(29200, "empty", 0.99);
    assert_eq!(events, vec![ScanEvent::SumReset { total: 20 }]);
    assert_eq!(h.session.sum(), 0);
    assert_eq!(
        h.spoken().last().unwrap(),
        "Sum of scanned bills: 20 dollars"
    );
}

// -------------------- Scenario D --------------------

#[test]
fn scenario_d_inactivity_announces_and_resets_sum() {
    let mut h = Harness::new();

    h.frames(0, 2000, "fiftyDollar", 0.97);
    assert_eq!(h.session.sum(), 50);

    let events = h.frames(2100, 23000, "empty", 0.99);

    assert_eq!(h.session.sum(), 0);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, ScanEvent::SumReset { .. }))
            .count(),
        1
    );
    assert_eq!(
        h.spoken(),
        vec![
            "50 dollars".to_string(),
            "Sum of scanned bills: 50 dollars".to_string()
        ]
    );
    // Back to ready well before the reset; still ready after it.
    assert_eq!(h.session.state(), ScanState::Ready);
}

// -------------------- Cooldown --------------------

#[test]
fn cooldown_ignores_new_banknotes_until_expiry() {
    let mut h = Harness::new();

    h.frames(0, 2000, "twentyDollar", 0.97);
    assert_eq!(h.session.state(), ScanState::Cooldown);

    // A perfectly confident note during cooldown is ignored.
    h.frames(2100, 6900, "hundredDollar", 0.99);
    assert_eq!(h.session.sum(), 20);

    // Cooldown expires 5s after the confirm; the next confident frame
    // starts a fresh validation.
    h.frame(7100, "hundredDollar", 0.99);
    assert_eq!(h.session.state(), ScanState::Validating);
    assert_eq!(h.session.candidate(), Some("hundredDollar"));
}

#[test]
fn repeated_scans_each_count_exactly_once() {
    let mut h = Harness::new();

    let mut start = 0u64;
    for _ in 0..3 {
        h.frames(start, start + 2000, "fiveDollar", 0.97);
        h.frames(start + 2100, start + 7100, "empty", 0.99);
        start += 7200;
    }

    assert_eq!(h.session.sum(), 15);
    assert_eq!(
        h.spoken(),
        vec![
            "5 dollars".to_string(),
            "5 dollars".to_string(),
            "5 dollars".to_string()
        ]
    );
}

// -------------------- Unrecognized confirmed label --------------------

#[test]
fn confirmed_unknown_label_reverts_without_accumulating() {
    let mut h = Harness::new();

    // "iou" passes validation (any non-empty label can) but has no
    // catalog value; the session must not wedge in Confirmed.
    h.frames(0, 2000, "iou", 0.97);

    assert_eq!(h.session.state(), ScanState::Ready);
    assert_eq!(h.session.sum(), 0);
    assert!(h.spoken().is_empty());

    // Scanning still works afterwards.
    h.frames(2200, 4300, "oneDollar", 0.97);
    assert_eq!(h.session.sum(), 1);
}

// -------------------- Session boundary --------------------

#[test]
fn reset_restores_start_of_session_state() {
    let mut h = Harness::new();

    h.frames(0, 2000, "tenDollar", 0.97);
    assert_eq!(h.session.sum(), 10);
    assert_eq!(h.session.state(), ScanState::Cooldown);

    h.session.reset();
    assert_eq!(h.session.state(), ScanState::Ready);
    assert_eq!(h.session.sum(), 0);
    assert_eq!(h.session.candidate(), None);
    assert_eq!(h.session.pending_sum_resets(), 0);
    assert!(h.session.latest_predictions().is_empty());

    // Cancelled timers stay cancelled: 20s later nothing is announced.
    h.frame(25000, "empty", 0.99);
    assert_eq!(h.session.sum(), 0);
    assert_eq!(h.spoken(), vec!["10 dollars".to_string()]);
}

#[test]
fn latest_predictions_expose_the_current_frame() {
    let mut h = Harness::new();

    h.frame(0, "fiveDollar", 0.97);
    let latest = h.session.latest_predictions().to_vec();
    assert_eq!(latest.len(), LABELS.len());
    let hot = latest.iter().find(|p| p.label == "fiveDollar").unwrap();
    assert!((hot.confidence - 0.97).abs() < 1e-6);
}
