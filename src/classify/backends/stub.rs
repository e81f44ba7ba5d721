use std::collections::VecDeque;

use anyhow::{anyhow, Result};

use crate::classify::backend::ClassifierBackend;
use crate::{validate_label, ClassPrediction};

/// Confidence assigned to the empty class once the script is exhausted.
const IDLE_EMPTY_CONFIDENCE: f32 = 0.98;

/// Scripted stub classifier for tests and the demo daemon.
///
/// Each frame pops the next `(label, confidence)` entry off the script
/// and spreads the remaining probability mass uniformly over the other
/// classes. When the script runs out, the stub reports the empty class.
pub struct StubClassifier {
    labels: Vec<String>,
    empty_label: String,
    script: VecDeque<(String, f32)>,
    frames_classified: u64,
}

impl StubClassifier {
    /// `labels` must include `empty_label`.
    pub fn new(labels: Vec<String>, empty_label: impl Into<String>) -> Result<Self> {
        let empty_label = empty_label.into();
        for label in &labels {
            validate_label(label)?;
        }
        if !labels.iter().any(|label| *label == empty_label) {
            return Err(anyhow!(
                "label set must include the empty label {:?}",
                empty_label
            ));
        }
        Ok(Self {
            labels,
            empty_label,
            script: VecDeque::new(),
            frames_classified: 0,
        })
    }

    /// Append `count` frames where `label` dominates with `confidence`.
    pub fn push_frames(&mut self, label: &str, confidence: f32, count: usize) -> Result<&mut Self> {
        if !self.labels.iter().any(|known| known == label) {
            return Err(anyhow!("scripted label {:?} is not a known class", label));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(anyhow!("scripted confidence must be in 0..=1"));
        }
        for _ in 0..count {
            self.script.push_back((label.to_string(), confidence));
        }
        Ok(self)
    }

    /// Append `count` frames of the empty/background class.
    pub fn push_empty_frames(&mut self, count: usize) -> Result<&mut Self> {
        let empty = self.empty_label.clone();
        self.push_frames(&empty, IDLE_EMPTY_CONFIDENCE, count)
    }

    pub fn remaining_script_frames(&self) -> usize {
        self.script.len()
    }

    pub fn frames_classified(&self) -> u64 {
        self.frames_classified
    }
}

impl ClassifierBackend for StubClassifier {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn class_labels(&self) -> &[String] {
        &self.labels
    }

    fn classify(
        &mut self,
        _pixels: &[u8],
        _width: u32,
        _height: u32,
    ) -> Result<Vec<ClassPrediction>> {
        self.frames_classified += 1;
        let (hot_label, hot_confidence) = self
            .script
            .pop_front()
            .unwrap_or_else(|| (self.empty_label.clone(), IDLE_EMPTY_CONFIDENCE));

        let rest = if self.labels.len() > 1 {
            (1.0 - hot_confidence) / (self.labels.len() - 1) as f32
        } else {
            0.0
        };

        Ok(self
            .labels
            .iter()
            .map(|label| {
                let confidence = if *label == hot_label { hot_confidence } else { rest };
                ClassPrediction::new(label.clone(), confidence)
            })
            .collect())
    }
}
