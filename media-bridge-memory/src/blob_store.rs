use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use media_bridge_core::{Blob, BlobReference, BlobStore, BridgeError};

/// In-process blob registry.
///
/// References look like `blob:<origin>/<uuid>` and stay valid until revoked.
pub struct MemoryBlobStore {
    origin: String,
    blobs: Mutex<HashMap<BlobReference, Blob>>,
    fail_reads: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            blobs: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Register bytes created by the host itself and return their reference.
    pub fn insert(&self, data: Vec<u8>, mime_type: &str) -> BlobReference {
        let reference = self.allocate_reference();
        self.blobs.lock().insert(reference.clone(), Blob::new(data, mime_type));
        reference
    }

    pub fn contains(&self, reference: &BlobReference) -> bool {
        self.blobs.lock().contains_key(reference)
    }

    /// Number of live (unrevoked) blobs.
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }

    /// Bytes held across all live blobs.
    pub fn total_bytes(&self) -> usize {
        self.blobs.lock().values().map(Blob::size).sum()
    }

    /// Make every subsequent `read_bytes` fail, as an unreadable blob would.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn allocate_reference(&self) -> BlobReference {
        BlobReference::new(format!("blob:{}/{}", self.origin, uuid::Uuid::new_v4()))
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("null")
    }
}

impl BlobStore for MemoryBlobStore {
    fn retrieve(&self, reference: &BlobReference) -> Result<Blob, BridgeError> {
        self.blobs
            .lock()
            .get(reference)
            .cloned()
            .ok_or_else(|| BridgeError::RetrievalFailed("Failed to fetch".into()))
    }

    fn read_bytes(&self, blob: &Blob) -> Result<Vec<u8>, BridgeError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BridgeError::DecodeFailed("Failed to read the blob.".into()));
        }
        Ok(blob.data.clone())
    }

    fn create(&self, blob: Blob) -> Result<BlobReference, BridgeError> {
        let reference = self.allocate_reference();
        log::debug!("Created {} ({} bytes, {})", reference, blob.size(), blob.mime_type);
        self.blobs.lock().insert(reference.clone(), blob);
        Ok(reference)
    }

    fn revoke(&self, reference: &BlobReference) {
        if self.blobs.lock().remove(reference).is_none() {
            log::debug!("Revoke of unknown blob URL ignored: {}", reference);
        }
    }
}
