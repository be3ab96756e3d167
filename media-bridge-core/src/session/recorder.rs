use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use crate::completion::{self, Completer, Completion};
use crate::models::audio_models::{AudioChunk, RecorderEvent, RecorderInfo};
use crate::models::blob::Blob;
use crate::models::config::RecorderConfiguration;
use crate::models::error::BridgeError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::models::state::RecorderState;
use crate::traits::audio_input::AudioInputProvider;
use crate::traits::blob_store::BlobStore;
use crate::traits::recorder_delegate::RecorderDelegate;

/// What the accumulator does when the provider reports it has stopped.
enum StopAction {
    Finalize(Completer<RecordingResult>),
    Discard(Completer<()>),
}

/// Internal mutable session state, protected by `parking_lot::Mutex`.
///
/// The chunks themselves are not here: the accumulator thread owns them.
struct SessionState {
    state: RecorderState,
    chunk_count: usize,
    capture_start: Option<Instant>,
    pending_stop: Option<StopAction>,
    /// Bumped for every session; an accumulator whose generation no longer
    /// matches has been abandoned and must not touch the state.
    generation: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            chunk_count: 0,
            capture_start: None,
            pending_stop: None,
            generation: 0,
        }
    }

    fn elapsed_secs(&self) -> f64 {
        self.capture_start
            .map(|start| start.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn reset(&mut self) {
        self.state = RecorderState::Idle;
        self.chunk_count = 0;
        self.capture_start = None;
        self.pending_stop = None;
    }
}

/// State and delegate shared between the controller and its accumulator.
#[derive(Clone)]
struct SessionShared {
    session_state: Arc<Mutex<SessionState>>,
    delegate: Option<Arc<dyn RecorderDelegate>>,
}

impl SessionShared {
    fn set_state(&self, new_state: RecorderState) {
        self.session_state.lock().state = new_state;
        self.notify_state(&new_state);
    }

    fn notify_state(&self, state: &RecorderState) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }

    fn notify_error(&self, error: &BridgeError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }
}

/// Controller for one audio capture session at a time.
///
/// Owns the session explicitly instead of holding it as ambient state:
/// ```text
/// [Provider producer] --RecorderEvent--> [Accumulator thread] --Blob--> [BlobStore]
///                                               │
///                                      Completion<RecordingResult>
/// ```
/// A second `start_recording` while a session is active is rejected.
pub struct AudioRecorder<P: AudioInputProvider, S: BlobStore> {
    provider: P,
    store: Arc<S>,
    config: RecorderConfiguration,
    session_state: Arc<Mutex<SessionState>>,
    delegate: Option<Arc<dyn RecorderDelegate>>,
    accumulator_handle: Option<thread::JoinHandle<()>>,
}

impl<P: AudioInputProvider, S: BlobStore + 'static> AudioRecorder<P, S> {
    pub fn new(provider: P, store: Arc<S>) -> Self {
        Self::with_config(provider, store, RecorderConfiguration::default())
    }

    pub fn with_config(provider: P, store: Arc<S>, config: RecorderConfiguration) -> Self {
        Self {
            provider,
            store,
            config,
            session_state: Arc::new(Mutex::new(SessionState::new())),
            delegate: None,
            accumulator_handle: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecorderDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> RecorderState {
        self.session_state.lock().state
    }

    /// Number of chunks held by the current session.
    pub fn chunk_count(&self) -> usize {
        self.session_state.lock().chunk_count
    }

    pub fn config(&self) -> &RecorderConfiguration {
        &self.config
    }

    /// Replace the configuration. Only allowed while idle.
    pub fn configure(&mut self, config: RecorderConfiguration) -> Result<(), BridgeError> {
        if !self.state().is_idle() {
            return Err(BridgeError::InvalidState(
                "can only configure from idle state".into(),
            ));
        }
        config.validate().map_err(BridgeError::ConfigurationFailed)?;
        self.config = config;
        Ok(())
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Acquire the input device and begin capture.
    /// Transitions: idle → requesting → recording (or back to idle on failure).
    pub fn start_recording(&mut self) -> Result<RecorderInfo, BridgeError> {
        if !self.state().is_idle() {
            return Err(BridgeError::AlreadyRecording);
        }

        self.config
            .validate()
            .map_err(BridgeError::ConfigurationFailed)?;
        if !self.provider.is_type_supported(&self.config.mime_type) {
            return Err(BridgeError::UnsupportedMimeType(self.config.mime_type.clone()));
        }
        if !self.provider.is_available() {
            log::error!("No audio input device available");
            return Err(BridgeError::DeviceNotAvailable("no audio input device".into()));
        }

        if let Some(handle) = self.accumulator_handle.take() {
            if handle.is_finished() {
                if handle.join().is_err() {
                    log::error!("Recorder accumulator thread panicked");
                }
            } else {
                log::warn!("Previous accumulator still running; detaching it");
            }
        }

        let generation = {
            let mut s = self.session_state.lock();
            s.generation += 1;
            s.generation
        };
        let shared = self.shared();
        shared.set_state(RecorderState::Requesting);

        let stream = match self.provider.request_stream() {
            Ok(stream) => stream,
            Err(e) => {
                log::error!("Error obtaining media stream: {}", e);
                return Err(self.fail_start(e));
            }
        };
        log::info!("Stream obtained: {} ({})", stream.id, stream.device_name);

        let (tx, rx) = crossbeam_channel::unbounded();

        let accumulator = Accumulator {
            shared: shared.clone(),
            store: Arc::clone(&self.store),
            mime_type: self.config.mime_type.clone(),
            generation,
        };
        let handle = thread::Builder::new()
            .name("recorder-accumulator".into())
            .spawn(move || accumulator.run(rx))
            .map_err(|e| BridgeError::Unknown(format!("failed to spawn accumulator thread: {}", e)));
        let handle = match handle {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail_start(e)),
        };
        self.accumulator_handle = Some(handle);

        {
            let mut s = self.session_state.lock();
            s.chunk_count = 0;
            s.capture_start = Some(Instant::now());
        }

        // Held until the state is settled so the accumulator cannot observe a
        // closed stream from a failed start.
        let hold_open = tx.clone();
        let info = match self.provider.start(&stream, &self.config, tx) {
            Ok(info) => info,
            Err(e) => {
                log::error!("Failed to start recorder: {}", e);
                let e = self.fail_start(e);
                drop(hold_open);
                return Err(e);
            }
        };

        // A provider that stopped on its own has already sent the session
        // back to idle.
        let recording = {
            let mut s = self.session_state.lock();
            if s.generation == generation && s.state == RecorderState::Requesting {
                let chunk_count = s.chunk_count;
                s.state = RecorderState::Recording { chunk_count };
                Some(s.state)
            } else {
                None
            }
        };
        if let Some(state) = recording {
            shared.notify_state(&state);
        }
        drop(hold_open);

        log::info!(
            "Recorder started: mime type {}, bitrate {:?}",
            info.mime_type,
            info.audio_bits_per_second
        );

        Ok(info)
    }

    /// Stop capture and assemble the recorded chunks into one blob.
    /// Transitions: recording → stopping → idle.
    ///
    /// Resolves to `NotInitialized` immediately when nothing is recording.
    pub fn stop_recording(&mut self) -> Completion<RecordingResult> {
        log::debug!("stop_recording called");
        let (completer, completion) = completion::pair();
        match self.begin_stop(StopAction::Finalize(completer)) {
            Ok(()) => completion,
            Err(e) => Completion::ready(Err(e)),
        }
    }

    /// Stop capture and discard everything recorded so far. No blob is
    /// created.
    pub fn abort_recording(&mut self) -> Completion<()> {
        let (completer, completion) = completion::pair();
        match self.begin_stop(StopAction::Discard(completer)) {
            Ok(()) => completion,
            Err(e) => Completion::ready(Err(e)),
        }
    }

    // --- Internal helpers ---

    fn shared(&self) -> SessionShared {
        SessionShared {
            session_state: Arc::clone(&self.session_state),
            delegate: self.delegate.clone(),
        }
    }

    /// Register the single-use stop action, then ask the provider to stop.
    fn begin_stop(&mut self, action: StopAction) -> Result<(), BridgeError> {
        {
            let mut s = self.session_state.lock();
            match s.state {
                RecorderState::Recording { .. } => {}
                RecorderState::Idle => {
                    log::error!("MediaRecorder not initialized");
                    return Err(BridgeError::NotInitialized);
                }
                _ => {
                    return Err(BridgeError::InvalidState(
                        "can only stop from recording state".into(),
                    ))
                }
            }
            s.pending_stop = Some(action);
            s.state = RecorderState::Stopping;
        }
        self.shared().notify_state(&RecorderState::Stopping);

        if let Err(e) = self.provider.stop() {
            log::error!("Failed to stop recorder: {}", e);
            let action = {
                let mut s = self.session_state.lock();
                s.generation += 1;
                let action = s.pending_stop.take();
                s.reset();
                action
            };
            let shared = self.shared();
            shared.notify_state(&RecorderState::Idle);
            shared.notify_error(&e);
            match action {
                Some(StopAction::Finalize(completer)) => completer.fail(e),
                Some(StopAction::Discard(completer)) => completer.fail(e),
                None => {}
            }
            return Ok(());
        }

        log::debug!("Stop recording called");
        Ok(())
    }

    /// Return to idle after a failed start and hand the error back.
    fn fail_start(&mut self, error: BridgeError) -> BridgeError {
        {
            let mut s = self.session_state.lock();
            s.generation += 1;
            s.reset();
        }
        let shared = self.shared();
        shared.notify_state(&RecorderState::Idle);
        shared.notify_error(&error);
        error
    }
}

impl<P: AudioInputProvider, S: BlobStore> Drop for AudioRecorder<P, S> {
    fn drop(&mut self) {
        let active = {
            let mut s = self.session_state.lock();
            let active = s.state.is_active();
            if active {
                s.generation += 1;
                s.reset();
            }
            active
        };
        if active {
            log::info!("Recorder dropped while active; stopping input");
            let _ = self.provider.stop();
        }
    }
}

/// Single owner of a session's chunk sequence.
///
/// Appends chunks in arrival order until the provider stops, then performs
/// whatever stop action was registered.
struct Accumulator<S: BlobStore> {
    shared: SessionShared,
    store: Arc<S>,
    mime_type: String,
    generation: u64,
}

impl<S: BlobStore> Accumulator<S> {
    fn run(self, events: Receiver<RecorderEvent>) {
        let mut chunks: Vec<AudioChunk> = Vec::new();
        let mut stopped = false;

        for event in events.iter() {
            match event {
                RecorderEvent::DataAvailable(payload) => {
                    let sequence = chunks.len() as u64;
                    let size = payload.len();
                    log::debug!("Data available: chunk size {}", size);
                    {
                        let mut s = self.shared.session_state.lock();
                        if s.generation != self.generation {
                            return;
                        }
                        s.chunk_count = chunks.len() + 1;
                        if let RecorderState::Recording { ref mut chunk_count } = s.state {
                            *chunk_count = chunks.len() + 1;
                        }
                    }
                    chunks.push(AudioChunk { sequence, payload });
                    if let Some(ref delegate) = self.shared.delegate {
                        delegate.on_chunk(sequence, size);
                    }
                }
                RecorderEvent::Stopped => {
                    stopped = true;
                    break;
                }
            }
        }

        self.finish(chunks, stopped);
    }

    fn finish(&self, chunks: Vec<AudioChunk>, stopped: bool) {
        let (action, duration_secs) = {
            let mut s = self.shared.session_state.lock();
            if s.generation != self.generation || s.state.is_idle() {
                return;
            }
            let duration = s.elapsed_secs();
            let action = s.pending_stop.take();
            s.reset();
            (action, duration)
        };

        match action {
            Some(StopAction::Finalize(completer)) => {
                let result = if stopped {
                    self.assemble(chunks, duration_secs)
                } else {
                    Err(BridgeError::DeviceNotAvailable(
                        "input stream closed before the recorder stopped".into(),
                    ))
                };
                self.shared.notify_state(&RecorderState::Idle);
                match &result {
                    Ok(recording) => {
                        if let Some(ref delegate) = self.shared.delegate {
                            delegate.on_recording_finished(recording);
                        }
                    }
                    Err(e) => self.shared.notify_error(e),
                }
                completer.complete(result);
            }
            Some(StopAction::Discard(completer)) => {
                log::info!("Recording aborted, discarded {} chunks", chunks.len());
                drop(chunks);
                self.shared.notify_state(&RecorderState::Idle);
                completer.succeed(());
            }
            None => {
                log::warn!(
                    "Input stream ended without a stop request, discarding {} chunks",
                    chunks.len()
                );
                drop(chunks);
                self.shared.notify_state(&RecorderState::Idle);
                self.shared.notify_error(&BridgeError::DeviceNotAvailable(
                    "input stream ended unexpectedly".into(),
                ));
            }
        }
    }

    /// Concatenate chunks in arrival order and register the blob.
    fn assemble(&self, chunks: Vec<AudioChunk>, duration_secs: f64) -> Result<RecordingResult, BridgeError> {
        let chunk_count = chunks.len();
        let blob = Blob::from_chunks(chunks, self.mime_type.as_str());
        let metadata = RecordingMetadata::for_blob(&blob, chunk_count, duration_secs);
        let reference = self.store.create(blob)?;
        log::info!(
            "Recording stopped, URL created: {} ({} bytes from {} chunks)",
            reference,
            metadata.size_bytes,
            chunk_count
        );
        Ok(RecordingResult::new(reference, metadata))
    }
}
