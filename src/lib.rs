//! Banknote Scan Kernel
//!
//! This crate implements the core of a banknote-counting aid: per-frame
//! classifier output is debounced into validated scan events, a running
//! monetary sum is accumulated, and results are spoken through an
//! announcer boundary.
//!
//! # Architecture
//!
//! The kernel is frame-driven and single-threaded. Exactly one
//! `process_frame` call is in flight at a time; timers are scheduled
//! callbacks that fire between frames, never concurrently with them.
//! Correctness relies on disciplined timer cancellation and state-guarded
//! timer callbacks, not on locks.
//!
//! # Module Structure
//!
//! - `scan`: the scan state machine (`ScanSession`) and announcer boundary
//! - `classify`: classifier backends producing per-class confidences
//! - `ingest`: frame sources (webcam, synthetic stub)
//! - `catalog`: label-to-value mapping for known banknotes
//! - `timer`: single-threaded cancellable one-shot timers
//! - `config`: runtime configuration

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub mod catalog;
pub mod classify;
pub mod config;
pub mod ingest;
pub mod scan;
pub mod timer;

pub use catalog::BanknoteCatalog;
pub use classify::{BackendRegistry, ClassifierBackend, StubClassifier};
pub use config::{ScannerConfig, WebcamSettings};
pub use ingest::{FrameSource, RawFrame, WebcamConfig, WebcamSource};
pub use scan::{Announcer, LogAnnouncer, ScanEvent, ScanSession, ScanState};
pub use timer::{TimerHandle, TimerKind, TimerService};

// -------------------- Predictions --------------------

/// One classifier output for one class on one frame.
///
/// The classifier returns one `ClassPrediction` per known class (including
/// the distinguished empty/background class) on every frame.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassPrediction {
    pub label: String,
    /// Confidence in 0..=1.
    pub confidence: f32,
}

impl ClassPrediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Select the highest-confidence prediction.
///
/// Comparison is strict greater-than, so ties are broken by first-seen
/// order: the lowest index wins.
pub fn best_prediction(predictions: &[ClassPrediction]) -> Option<&ClassPrediction> {
    let mut best: Option<&ClassPrediction> = None;
    for prediction in predictions {
        match best {
            Some(current) if prediction.confidence > current.confidence => {
                best = Some(prediction);
            }
            None => best = Some(prediction),
            _ => {}
        }
    }
    best
}

// -------------------- Label Discipline --------------------

/// A conforming class label is a short identifier, not free text.
///
/// Allowed: "oneDollar", "hundredDollar", "empty", "base_case"
/// Disallowed: anything with whitespace, slashes, or punctuation outside [_-].
pub fn validate_label(label: &str) -> Result<()> {
    // Compile once for hot paths.
    static LABEL_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = LABEL_RE.get_or_init(|| regex::Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{0,63}$").unwrap());

    if !re.is_match(label) {
        return Err(anyhow!(
            "label must match ^[A-Za-z][A-Za-z0-9_-]{{0,63}}$, got {:?}",
            label
        ));
    }
    Ok(())
}
