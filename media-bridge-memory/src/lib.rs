//! # media-bridge-memory
//!
//! In-process host backend for media-bridge.
//!
//! Provides:
//! - `MemoryBlobStore`: blob registry addressed by `blob:<origin>/<uuid>` references
//! - `SimulatedMicrophone`: permission-gated input device whose producer thread
//!   emits queued chunks
//! - `permissions`: microphone access policy
//!
//! ## Usage
//! ```
//! use std::sync::Arc;
//! use media_bridge_core::{AudioRecorder, BlobFetcher};
//! use media_bridge_memory::{MemoryBlobStore, SimulatedMicrophone};
//!
//! let store = Arc::new(MemoryBlobStore::new("null"));
//! let mic = SimulatedMicrophone::new();
//! let feed = mic.feed();
//! let mut recorder = AudioRecorder::new(mic, Arc::clone(&store));
//!
//! recorder.start_recording().unwrap();
//! feed.push(vec![1u8, 2, 3]);
//! let recording = recorder.stop_recording().wait().unwrap();
//!
//! let fetcher = BlobFetcher::new(store);
//! assert_eq!(fetcher.fetch(&recording.reference).wait().unwrap(), vec![1, 2, 3]);
//! fetcher.release_reference(&recording.reference);
//! ```

pub mod blob_store;
pub mod permissions;
pub mod simulated_mic;

pub use blob_store::MemoryBlobStore;
pub use permissions::PermissionPolicy;
pub use simulated_mic::{MicrophoneFeed, SimulatedMicrophone};
