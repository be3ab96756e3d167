use serde::{Deserialize, Serialize};

use super::error::BridgeError;

/// Configuration for an audio recording session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfiguration {
    /// Container/codec the recorder encodes into (default: `audio/webm`).
    pub mime_type: String,

    /// Requested encoder bitrate, or None to let the host choose.
    pub audio_bits_per_second: Option<u32>,

    /// Interval between chunk emissions in milliseconds, or None to let the
    /// host choose.
    pub timeslice_ms: Option<u64>,
}

impl RecorderConfiguration {
    pub const DEFAULT_MIME_TYPE: &'static str = "audio/webm";

    pub fn validate(&self) -> Result<(), String> {
        let mime = self.mime_type.trim();
        if mime.is_empty() {
            return Err("mime type must not be empty".into());
        }
        if !mime.starts_with("audio/") {
            return Err(format!("not an audio mime type: {}", mime));
        }
        if self.audio_bits_per_second == Some(0) {
            return Err("audio bitrate must be positive".into());
        }
        if self.timeslice_ms == Some(0) {
            return Err("timeslice must be positive".into());
        }
        Ok(())
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BridgeError::ConfigurationFailed(format!("invalid configuration: {}", e)))?;
        config.validate().map_err(BridgeError::ConfigurationFailed)?;
        Ok(config)
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            mime_type: Self::DEFAULT_MIME_TYPE.to_string(),
            audio_bits_per_second: None,
            timeslice_ms: None,
        }
    }
}
