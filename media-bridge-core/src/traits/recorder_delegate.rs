use crate::models::error::BridgeError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecorderState;

/// Event delegate for recording session notifications.
///
/// Methods are called from whichever thread drives the transition, usually
/// the session accumulator thread. Implementations should marshal to their
/// own thread if needed.
pub trait RecorderDelegate: Send + Sync {
    fn on_state_changed(&self, state: &RecorderState);

    /// Called for each chunk appended to the session, with its size in bytes.
    fn on_chunk(&self, sequence: u64, size: usize);

    fn on_error(&self, error: &BridgeError);

    fn on_recording_finished(&self, result: &RecordingResult);
}
