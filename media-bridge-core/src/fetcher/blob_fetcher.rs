use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::completion::{self, Completion};
use crate::models::blob::{BlobReference, CompletionResult};
use crate::models::error::BridgeError;
use crate::traits::blob_store::BlobStore;

/// Turns blob references into bytes and releases them.
///
/// Each fetch runs retrieval then decode on its own worker thread. Fetches of
/// different references are independent and complete in no particular order.
pub struct BlobFetcher<S: BlobStore> {
    store: Arc<S>,
}

impl<S: BlobStore> Clone for BlobFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: BlobStore + 'static> BlobFetcher<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fetch the bytes behind `reference`.
    pub fn fetch(&self, reference: &BlobReference) -> Completion<Vec<u8>> {
        let (completer, completion) = completion::pair();
        let store = Arc::clone(&self.store);
        let reference = reference.clone();

        log::debug!("Fetching blob URL: {}", reference);

        let spawned = thread::Builder::new()
            .name("blob-fetch".into())
            .spawn(move || completer.complete(fetch_blocking(store.as_ref(), &reference)));

        match spawned {
            Ok(_) => completion,
            Err(e) => {
                log::error!("Failed to spawn fetch thread: {}", e);
                Completion::ready(Err(BridgeError::Unknown(format!(
                    "failed to spawn fetch thread: {}",
                    e
                ))))
            }
        }
    }

    /// Fetch the bytes behind `reference` and hand the outcome to
    /// `on_complete`, which runs exactly once on a worker thread.
    pub fn fetch_bytes<F>(&self, reference: &BlobReference, on_complete: F)
    where
        F: FnOnce(CompletionResult) + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let reference = reference.clone();
        // Shared so the callback can still be fired if the worker never starts.
        let callback = Arc::new(Mutex::new(Some(on_complete)));
        let worker_callback = Arc::clone(&callback);

        log::debug!("Fetching blob URL: {}", reference);

        let spawned = thread::Builder::new().name("blob-fetch".into()).spawn(move || {
            let result = fetch_blocking(store.as_ref(), &reference);
            let on_complete = worker_callback.lock().take();
            if let Some(on_complete) = on_complete {
                on_complete(CompletionResult::from(result));
            }
        });

        if let Err(e) = spawned {
            log::error!("Failed to spawn fetch thread: {}", e);
            let on_complete = callback.lock().take();
            if let Some(on_complete) = on_complete {
                on_complete(CompletionResult::failure(format!(
                    "failed to spawn fetch thread: {}",
                    e
                )));
            }
        }
    }

    /// Invalidate `reference` in the host store.
    pub fn release_reference(&self, reference: &BlobReference) {
        log::debug!("Releasing blob URL: {}", reference);
        self.store.revoke(reference);
    }
}

/// Retrieval followed by decode, on the calling thread.
fn fetch_blocking<S: BlobStore + ?Sized>(
    store: &S,
    reference: &BlobReference,
) -> Result<Vec<u8>, BridgeError> {
    let blob = store.retrieve(reference).map_err(|e| {
        log::error!("Error fetching the blob URL: {}", e);
        e
    })?;
    log::debug!("Blob fetched, size: {}", blob.size());

    let bytes = store.read_bytes(&blob).map_err(|e| {
        log::error!("Failed to read the blob: {}", e);
        e
    })?;
    log::debug!("Blob read successfully, {} bytes", bytes.len());

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::mpsc;
    use std::time::Duration;

    use crate::models::blob::Blob;

    #[derive(Default)]
    struct FakeStore {
        blobs: Mutex<HashMap<String, Blob>>,
        next_id: Mutex<u32>,
        unreadable: bool,
    }

    impl BlobStore for FakeStore {
        fn retrieve(&self, reference: &BlobReference) -> Result<Blob, BridgeError> {
            self.blobs
                .lock()
                .get(reference.as_str())
                .cloned()
                .ok_or_else(|| BridgeError::RetrievalFailed("Failed to fetch".into()))
        }

        fn read_bytes(&self, blob: &Blob) -> Result<Vec<u8>, BridgeError> {
            if self.unreadable {
                return Err(BridgeError::DecodeFailed("Failed to read the blob.".into()));
            }
            Ok(blob.data.clone())
        }

        fn create(&self, blob: Blob) -> Result<BlobReference, BridgeError> {
            let mut id = self.next_id.lock();
            *id += 1;
            let reference = format!("blob:fake/{}", id);
            self.blobs.lock().insert(reference.clone(), blob);
            Ok(BlobReference::from(reference))
        }

        fn revoke(&self, reference: &BlobReference) {
            self.blobs.lock().remove(reference.as_str());
        }
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn fetch_returns_exact_bytes() {
        let store = Arc::new(FakeStore::default());
        let reference = store.create(Blob::new(vec![1, 2, 3, 4], "audio/webm")).unwrap();
        let fetcher = BlobFetcher::new(store);

        assert_eq!(fetcher.fetch(&reference).wait(), Ok(vec![1, 2, 3, 4]));
    }

    #[test]
    fn fetch_bytes_invokes_callback_once() {
        let store = Arc::new(FakeStore::default());
        let reference = store.create(Blob::new(vec![5; 10], "audio/webm")).unwrap();
        let fetcher = BlobFetcher::new(store);

        let (tx, rx) = mpsc::channel();
        fetcher.fetch_bytes(&reference, move |result| tx.send(result).unwrap());

        let result = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result.data(), Some(&[5u8; 10][..]));
        assert!(result.error().is_none());
        // Sender moved into the callback is gone once it has run.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn unknown_reference_reports_error() {
        let fetcher = BlobFetcher::new(Arc::new(FakeStore::default()));

        let (tx, rx) = mpsc::channel();
        fetcher.fetch_bytes(&BlobReference::from("blob:invalid-or-revoked"), move |result| {
            tx.send(result).unwrap()
        });

        let result = rx.recv_timeout(WAIT).unwrap();
        assert!(result.data().is_none());
        assert_eq!(result.error(), Some("Failed to fetch"));
    }

    #[test]
    fn decode_failure_uses_same_channel() {
        let store = Arc::new(FakeStore {
            unreadable: true,
            ..Default::default()
        });
        let reference = store.create(Blob::new(vec![1], "audio/webm")).unwrap();
        let fetcher = BlobFetcher::new(store);

        let (tx, rx) = mpsc::channel();
        fetcher.fetch_bytes(&reference, move |result| tx.send(result).unwrap());

        let result = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result.error(), Some("Failed to read the blob."));
    }

    #[test]
    fn release_makes_reference_unfetchable() {
        let store = Arc::new(FakeStore::default());
        let reference = store.create(Blob::new(vec![1, 2], "audio/webm")).unwrap();
        let fetcher = BlobFetcher::new(store);

        fetcher.release_reference(&reference);

        assert!(matches!(
            fetcher.fetch(&reference).wait(),
            Err(BridgeError::RetrievalFailed(_))
        ));
    }
}
