/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → requesting → recording → stopping → idle
///            ↓
///          idle (device or permission failure)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Requesting,
    Recording { chunk_count: usize },
    Stopping,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// Whether a session currently holds the input device.
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Recording { .. } => "recording",
            Self::Stopping => "stopping",
        }
    }
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::Idle
    }
}
