use crossbeam_channel::Sender;

use crate::models::audio_models::{InputStreamInfo, RecorderEvent, RecorderInfo};
use crate::models::config::RecorderConfiguration;
use crate::models::error::BridgeError;

/// Channel a provider emits recorder events on.
pub type RecorderEventSender = Sender<RecorderEvent>;

/// Interface for host audio input devices and their encoders.
///
/// Implemented by:
/// - `SimulatedMicrophone` (in-process producer thread)
pub trait AudioInputProvider: Send {
    /// Whether an input device is present at all. Checked before
    /// `request_stream`.
    fn is_available(&self) -> bool;

    /// Whether the encoder can produce `mime_type`.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Acquire a live stream from the default input device.
    ///
    /// Fails with `PermissionDenied` or `DeviceNotAvailable`.
    fn request_stream(&mut self) -> Result<InputStreamInfo, BridgeError>;

    /// Bind a recorder to `stream` and begin emitting events on `events`.
    ///
    /// Chunks are sent as `RecorderEvent::DataAvailable` in capture order.
    fn start(
        &mut self,
        stream: &InputStreamInfo,
        config: &RecorderConfiguration,
        events: RecorderEventSender,
    ) -> Result<RecorderInfo, BridgeError>;

    /// Request a stop. Must not block on the flush.
    ///
    /// The provider flushes any buffered audio as a final `DataAvailable`,
    /// then sends exactly one `RecorderEvent::Stopped` and drops its sender.
    fn stop(&mut self) -> Result<(), BridgeError>;
}
