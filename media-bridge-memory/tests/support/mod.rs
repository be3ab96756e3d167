#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use media_bridge_core::{BridgeError, RecorderDelegate, RecorderState, RecordingResult};

pub const WAIT: Duration = Duration::from_secs(5);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Poll `condition` until it holds or `WAIT` elapses.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[derive(Default)]
pub struct CollectingDelegate {
    pub states: Mutex<Vec<RecorderState>>,
    pub chunk_sizes: Mutex<Vec<usize>>,
    pub errors: Mutex<Vec<BridgeError>>,
    pub finished: Mutex<Vec<RecordingResult>>,
}

impl CollectingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl RecorderDelegate for CollectingDelegate {
    fn on_state_changed(&self, state: &RecorderState) {
        self.states.lock().push(*state);
    }

    fn on_chunk(&self, _sequence: u64, size: usize) {
        self.chunk_sizes.lock().push(size);
    }

    fn on_error(&self, error: &BridgeError) {
        self.errors.lock().push(error.clone());
    }

    fn on_recording_finished(&self, result: &RecordingResult) {
        self.finished.lock().push(result.clone());
    }
}
