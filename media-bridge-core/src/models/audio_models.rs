use serde::{Deserialize, Serialize};

/// One incrementally emitted fragment of encoded audio.
///
/// `sequence` is the arrival index within its session, starting at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub sequence: u64,
    pub payload: Vec<u8>,
}

impl AudioChunk {
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

impl AsRef<[u8]> for AudioChunk {
    fn as_ref(&self) -> &[u8] {
        &self.payload
    }
}

/// A live input stream handed out by the host after device acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputStreamInfo {
    pub id: String,
    pub device_name: String,
    pub is_default: bool,
}

/// What the recorder reports once bound to a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderInfo {
    pub mime_type: String,
    pub audio_bits_per_second: Option<u32>,
}

/// Notifications flowing from a provider's producer thread to the session
/// accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A chunk of encoded audio. Order of arrival is the order of assembly.
    DataAvailable(Vec<u8>),
    /// The recorder has flushed its last chunk and stopped.
    Stopped,
}
