use anyhow::Result;

use crate::ClassPrediction;

/// Classifier backend trait.
///
/// A backend maps a frame to an ordered list of per-class confidences.
/// The label set is fixed for the lifetime of the backend, and every
/// `classify` call returns one prediction per known class, in the order
/// reported by `class_labels`.
///
/// Implementations must treat the pixel slice as read-only and ephemeral.
pub trait ClassifierBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Known class labels, including the empty/background class.
    fn class_labels(&self) -> &[String];

    /// Classify one frame.
    fn classify(&mut self, pixels: &[u8], width: u32, height: u32)
        -> Result<Vec<ClassPrediction>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
