//! # media-bridge-core
//!
//! Host-agnostic core for moving media between a host application and its
//! in-memory blob store.
//!
//! Provides byte retrieval from blob references and single-session audio
//! recording that assembles captured chunks into a new blob. Host backends
//! implement the `BlobStore` and `AudioInputProvider` traits and plug into
//! the generic `BlobFetcher` and `AudioRecorder`.
//!
//! ## Architecture
//!
//! ```text
//! media-bridge-core (this crate)
//! ├── traits/       ← BlobStore, AudioInputProvider, RecorderDelegate
//! ├── models/       ← BridgeError, RecorderState, RecorderConfiguration, Blob, etc.
//! ├── completion/   ← Completion / Completer single-shot results
//! ├── fetcher/      ← BlobFetcher
//! └── session/      ← AudioRecorder (session controller + chunk accumulator)
//! ```

pub mod completion;
pub mod fetcher;
pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use completion::{Completer, Completion};
pub use fetcher::blob_fetcher::BlobFetcher;
pub use models::audio_models::{AudioChunk, InputStreamInfo, RecorderEvent, RecorderInfo};
pub use models::blob::{Blob, BlobReference, CompletionResult};
pub use models::config::RecorderConfiguration;
pub use models::error::BridgeError;
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::RecorderState;
pub use session::recorder::AudioRecorder;
pub use traits::audio_input::{AudioInputProvider, RecorderEventSender};
pub use traits::blob_store::BlobStore;
pub use traits::recorder_delegate::RecorderDelegate;
