/// Speech-synthesis boundary.
///
/// Fire-and-forget: the underlying engine may queue or drop utterances,
/// and the kernel never waits for completion.
pub trait Announcer {
    fn speak(&mut self, text: &str);
}

/// Announcer that writes utterances to the log instead of an audio engine.
#[derive(Debug, Default)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn speak(&mut self, text: &str) {
        log::info!("announce: {}", text);
    }
}

/// Spoken phrase for a single confirmed banknote.
pub(crate) fn note_phrase(value: u64) -> String {
    if value == 1 {
        format!("{} dollar", value)
    } else {
        format!("{} dollars", value)
    }
}

/// Spoken phrase for the sum-reset announcement.
pub(crate) fn sum_phrase(total: u64) -> String {
    format!("Sum of scanned bills: {} dollars", total)
}
