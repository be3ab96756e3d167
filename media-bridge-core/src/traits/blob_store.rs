use crate::models::blob::{Blob, BlobReference};
use crate::models::error::BridgeError;

/// Host-side store of in-memory binary resources addressed by reference.
///
/// Implemented by:
/// - `MemoryBlobStore` (in-process registry)
///
/// Methods may block; callers run them off the caller's thread.
pub trait BlobStore: Send + Sync {
    /// Resolve `reference` to the resource behind it.
    ///
    /// Fails with `RetrievalFailed` when the reference is unknown, revoked or
    /// otherwise inaccessible.
    fn retrieve(&self, reference: &BlobReference) -> Result<Blob, BridgeError>;

    /// Materialize the bytes of a retrieved resource.
    ///
    /// Fails with `DecodeFailed` when the host cannot read the resource.
    fn read_bytes(&self, blob: &Blob) -> Result<Vec<u8>, BridgeError>;

    /// Register `blob` and allocate a fresh reference to it.
    fn create(&self, blob: Blob) -> Result<BlobReference, BridgeError>;

    /// Invalidate `reference`, freeing the resource behind it.
    ///
    /// Behavior for unknown or already-revoked references is up to the host.
    fn revoke(&self, reference: &BlobReference);
}
