//! Simulated microphone capture provider.
//!
//! Stands in for a host input device and its encoder. Payloads queued on a
//! [`MicrophoneFeed`] are emitted as chunks by a dedicated producer thread.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use media_bridge_core::{
    AudioInputProvider, BridgeError, InputStreamInfo, RecorderConfiguration, RecorderEvent,
    RecorderEventSender, RecorderInfo,
};

use crate::permissions::{check_microphone_permission, PermissionPolicy};

const DEFAULT_CHUNK_INTERVAL: Duration = Duration::from_millis(20);
const DEFAULT_BITS_PER_SECOND: u32 = 128_000;

/// Handle for feeding encoded audio into a [`SimulatedMicrophone`].
///
/// Cheap to clone; all clones feed the same device.
#[derive(Clone, Default)]
pub struct MicrophoneFeed {
    queue: Arc<Mutex<VecDeque<Vec<u8>>>>,
    disconnected: Arc<AtomicBool>,
    capturing: Arc<AtomicBool>,
}

impl MicrophoneFeed {
    /// Queue one chunk. Chunks are emitted in push order.
    pub fn push(&self, payload: impl Into<Vec<u8>>) {
        self.queue.lock().push_back(payload.into());
    }

    /// Chunks queued but not yet emitted.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Simulate the device going away mid-capture.
    ///
    /// The producer thread exits without a stop notification.
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }

    /// Whether the producer thread is alive.
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn drain(&self) -> Vec<Vec<u8>> {
        self.queue.lock().drain(..).collect()
    }

    fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

/// Simulated microphone.
///
/// Acquisition is gated by a [`PermissionPolicy`] and device presence. While
/// capturing, queued payloads are emitted every chunk interval; on stop the
/// queue is flushed and a single `Stopped` follows.
///
/// `stop` only signals the producer thread. The thread is joined on the next
/// `start` or when the microphone is dropped.
pub struct SimulatedMicrophone {
    device_name: String,
    device_present: bool,
    permission: PermissionPolicy,
    supported_types: Vec<String>,
    chunk_interval: Duration,
    feed: MicrophoneFeed,
    stop_signal: Option<Sender<()>>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl SimulatedMicrophone {
    /// A present, permitted default microphone.
    pub fn new() -> Self {
        Self {
            device_name: "Simulated Microphone".into(),
            device_present: true,
            permission: PermissionPolicy::Granted,
            supported_types: vec![
                "audio/webm".into(),
                "audio/webm;codecs=opus".into(),
                "audio/ogg;codecs=opus".into(),
            ],
            chunk_interval: DEFAULT_CHUNK_INTERVAL,
            feed: MicrophoneFeed::default(),
            stop_signal: None,
            capture_handle: Mutex::new(None),
        }
    }

    pub fn with_permission(mut self, permission: PermissionPolicy) -> Self {
        self.permission = permission;
        self
    }

    /// No input device at all.
    pub fn without_device(mut self) -> Self {
        self.device_present = false;
        self
    }

    pub fn with_supported_types(mut self, types: Vec<String>) -> Self {
        self.supported_types = types;
        self
    }

    pub fn with_chunk_interval(mut self, interval: Duration) -> Self {
        self.chunk_interval = interval;
        self
    }

    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    pub fn feed(&self) -> MicrophoneFeed {
        self.feed.clone()
    }

    pub fn is_running(&self) -> bool {
        self.feed.is_capturing()
    }

    fn join_capture_thread(&self) {
        if let Some(handle) = self.capture_handle.lock().take() {
            if handle.join().is_err() {
                log::error!("Simulated capture thread panicked");
            }
        }
    }
}

impl Default for SimulatedMicrophone {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulatedMicrophone {
    fn drop(&mut self) {
        self.stop_signal.take();
        self.join_capture_thread();
    }
}

fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

impl AudioInputProvider for SimulatedMicrophone {
    fn is_available(&self) -> bool {
        self.device_present
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        let wanted = normalize_mime(mime_type);
        self.supported_types
            .iter()
            .any(|supported| normalize_mime(supported) == wanted)
    }

    fn request_stream(&mut self) -> Result<InputStreamInfo, BridgeError> {
        check_microphone_permission(self.permission, self.device_present)?;
        Ok(InputStreamInfo {
            id: uuid::Uuid::new_v4().to_string(),
            device_name: self.device_name.clone(),
            is_default: true,
        })
    }

    fn start(
        &mut self,
        stream: &InputStreamInfo,
        config: &RecorderConfiguration,
        events: RecorderEventSender,
    ) -> Result<RecorderInfo, BridgeError> {
        if self.stop_signal.is_some() {
            return Err(BridgeError::InvalidState("mic capture already running".into()));
        }
        if !self.is_type_supported(&config.mime_type) {
            return Err(BridgeError::UnsupportedMimeType(config.mime_type.clone()));
        }

        // A previous capture has been signalled; wait for its final flush.
        self.join_capture_thread();

        // Anything left over from an earlier stream is not part of this one.
        let stale = self.feed.drain();
        if !stale.is_empty() {
            log::debug!("Discarding {} chunks queued before start", stale.len());
        }
        self.feed.disconnected.store(false, Ordering::SeqCst);

        let interval = config
            .timeslice_ms
            .map(Duration::from_millis)
            .unwrap_or(self.chunk_interval);

        let (stop_tx, stop_rx) = bounded(1);
        self.feed.capturing.store(true, Ordering::SeqCst);
        let feed = self.feed.clone();
        let stream_id = stream.id.clone();

        let handle = thread::Builder::new()
            .name("simulated-mic-capture".into())
            .spawn(move || {
                capture_loop(&stop_rx, &feed, &events, interval);
                log::debug!("Simulated capture for stream {} ended", stream_id);
                feed.capturing.store(false, Ordering::SeqCst);
            })
            .map_err(|e| {
                self.feed.capturing.store(false, Ordering::SeqCst);
                BridgeError::Unknown(format!("failed to spawn mic thread: {}", e))
            })?;

        *self.capture_handle.lock() = Some(handle);
        self.stop_signal = Some(stop_tx);

        Ok(RecorderInfo {
            mime_type: config.mime_type.clone(),
            audio_bits_per_second: Some(config.audio_bits_per_second.unwrap_or(DEFAULT_BITS_PER_SECOND)),
        })
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        match self.stop_signal.take() {
            Some(signal) => {
                // The thread may already be gone after a disconnect.
                let _ = signal.try_send(());
                Ok(())
            }
            None => Err(BridgeError::InvalidState("mic capture not running".into())),
        }
    }
}

/// Producer loop running on a dedicated thread.
///
/// Sequence:
/// 1. Emit every queued chunk, then wait one interval or until stop is signalled
/// 2. On disconnect, exit without a stop notification
/// 3. On stop, flush the queue as final chunks, then send `Stopped`
fn capture_loop(
    stop: &Receiver<()>,
    feed: &MicrophoneFeed,
    events: &RecorderEventSender,
    interval: Duration,
) {
    loop {
        if feed.is_disconnected() {
            log::warn!("Simulated input device disconnected");
            return;
        }
        if !emit(feed, events) {
            return;
        }
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if !emit(feed, events) {
        return;
    }
    let _ = events.send(RecorderEvent::Stopped);
}

/// Send everything queued. Returns false once the receiver is gone.
fn emit(feed: &MicrophoneFeed, events: &RecorderEventSender) -> bool {
    for payload in feed.drain() {
        log::trace!("Emitting chunk of {} bytes", payload.len());
        if events.send(RecorderEvent::DataAvailable(payload)).is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> InputStreamInfo {
        InputStreamInfo {
            id: "s".into(),
            device_name: "d".into(),
            is_default: true,
        }
    }

    #[test]
    fn supported_types_ignore_case_and_spaces() {
        let mic = SimulatedMicrophone::new();
        assert!(mic.is_type_supported("audio/webm"));
        assert!(mic.is_type_supported("Audio/Ogg; codecs=opus"));
        assert!(!mic.is_type_supported("audio/wav"));
    }

    #[test]
    fn granted_stream_reports_device() {
        let mut mic = SimulatedMicrophone::new().with_device_name("USB Headset");
        assert!(mic.is_available());
        let stream = mic.request_stream().unwrap();
        assert_eq!(stream.device_name, "USB Headset");
        assert!(stream.is_default);
    }

    #[test]
    fn denied_permission_blocks_stream() {
        let mut mic = SimulatedMicrophone::new().with_permission(PermissionPolicy::Denied);
        assert_eq!(mic.request_stream(), Err(BridgeError::PermissionDenied));
    }

    #[test]
    fn stop_flushes_queue_then_signals_stopped() {
        let mut mic = SimulatedMicrophone::new().with_chunk_interval(Duration::from_millis(5));
        let feed = mic.feed();
        let (tx, rx) = crossbeam_channel::unbounded();

        mic.start(&stream(), &RecorderConfiguration::default(), tx).unwrap();
        feed.push(vec![1u8]);
        feed.push(vec![2u8, 2]);
        mic.stop().unwrap();

        let events: Vec<RecorderEvent> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                RecorderEvent::DataAvailable(vec![1]),
                RecorderEvent::DataAvailable(vec![2, 2]),
                RecorderEvent::Stopped,
            ]
        );
        assert!(!mic.is_running());
    }

    #[test]
    fn disconnect_ends_stream_without_stopped() {
        let mut mic = SimulatedMicrophone::new().with_chunk_interval(Duration::from_millis(5));
        let feed = mic.feed();
        let (tx, rx) = crossbeam_channel::unbounded();

        mic.start(&stream(), &RecorderConfiguration::default(), tx).unwrap();
        feed.disconnect();

        let events: Vec<RecorderEvent> = rx.iter().collect();
        assert!(!events.contains(&RecorderEvent::Stopped));
    }

    #[test]
    fn double_start_is_rejected() {
        let mut mic = SimulatedMicrophone::new();
        let (tx, _rx) = crossbeam_channel::unbounded();
        mic.start(&stream(), &RecorderConfiguration::default(), tx.clone()).unwrap();

        assert!(mic.start(&stream(), &RecorderConfiguration::default(), tx).is_err());
        mic.stop().unwrap();
    }

    #[test]
    fn stop_when_idle_is_an_error() {
        let mut mic = SimulatedMicrophone::new();
        assert!(mic.stop().is_err());
    }

    #[test]
    fn stop_signals_without_waiting_for_interval() {
        let mut mic = SimulatedMicrophone::new();
        let feed = mic.feed();
        let (tx, rx) = crossbeam_channel::unbounded();
        let config = RecorderConfiguration {
            timeslice_ms: Some(3000),
            ..Default::default()
        };

        mic.start(&stream(), &config, tx).unwrap();
        feed.push(vec![4u8; 4]);

        let begun = std::time::Instant::now();
        mic.stop().unwrap();
        assert!(begun.elapsed() < Duration::from_millis(500));

        let events: Vec<RecorderEvent> = rx.iter().collect();
        assert_eq!(events.last(), Some(&RecorderEvent::Stopped));
        assert!(begun.elapsed() < Duration::from_millis(1500));
        assert!(mic.stop().is_err());
    }

    #[test]
    fn restart_after_stop_reuses_device() {
        let mut mic = SimulatedMicrophone::new().with_chunk_interval(Duration::from_millis(5));
        let feed = mic.feed();

        let (tx, rx) = crossbeam_channel::unbounded();
        mic.start(&stream(), &RecorderConfiguration::default(), tx).unwrap();
        mic.stop().unwrap();

        let (tx, second) = crossbeam_channel::unbounded();
        mic.start(&stream(), &RecorderConfiguration::default(), tx).unwrap();
        feed.push(vec![9u8]);
        mic.stop().unwrap();

        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![RecorderEvent::Stopped]);
        assert_eq!(
            second.iter().collect::<Vec<_>>(),
            vec![RecorderEvent::DataAvailable(vec![9]), RecorderEvent::Stopped]
        );
    }
}
