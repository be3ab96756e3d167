//! Single-shot result delivery.
//!
//! A [`Completer`] is consumed when it fires, so each [`Completion`] resolves
//! exactly once. Dropping an unfired completer resolves the completion to
//! [`BridgeError::Aborted`].

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::models::error::BridgeError;

/// Create a connected completer/completion pair.
pub fn pair<T>() -> (Completer<T>, Completion<T>) {
    let (tx, rx) = bounded(1);
    (Completer { tx }, Completion { rx })
}

/// Sending half. Fires at most once.
pub struct Completer<T> {
    tx: Sender<Result<T, BridgeError>>,
}

impl<T> Completer<T> {
    pub fn complete(self, result: Result<T, BridgeError>) {
        // The receiver may already be gone; nobody is waiting then.
        if self.tx.send(result).is_err() {
            log::debug!("completion dropped before it was resolved");
        }
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: BridgeError) {
        self.complete(Err(error));
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer").finish_non_exhaustive()
    }
}

/// Receiving half of a single-shot result.
pub struct Completion<T> {
    rx: Receiver<Result<T, BridgeError>>,
}

impl<T> Completion<T> {
    /// A completion that is already resolved.
    pub fn ready(result: Result<T, BridgeError>) -> Self {
        let (completer, completion) = pair();
        completer.complete(result);
        completion
    }

    /// Block until the result is available.
    pub fn wait(self) -> Result<T, BridgeError> {
        self.rx.recv().unwrap_or(Err(BridgeError::Aborted))
    }

    /// Block for at most `timeout`. On timeout the completion is handed back
    /// so the caller can keep waiting.
    pub fn wait_timeout(self, timeout: Duration) -> Result<Result<T, BridgeError>, Self> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Ok(result),
            Err(RecvTimeoutError::Disconnected) => Ok(Err(BridgeError::Aborted)),
            Err(RecvTimeoutError::Timeout) => Err(self),
        }
    }

    /// Take the result if it has already arrived.
    pub fn try_take(&self) -> Option<Result<T, BridgeError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Disconnected) => Some(Err(BridgeError::Aborted)),
            Err(TryRecvError::Empty) => None,
        }
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("resolved", &!self.rx.is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn resolves_across_threads() {
        let (completer, completion) = pair::<u32>();
        let handle = thread::spawn(move || completer.succeed(42));
        assert_eq!(completion.wait(), Ok(42));
        handle.join().unwrap();
    }

    #[test]
    fn ready_is_immediately_available() {
        let completion = Completion::<()>::ready(Err(BridgeError::NotInitialized));
        assert_eq!(completion.try_take(), Some(Err(BridgeError::NotInitialized)));
    }

    #[test]
    fn dropped_completer_aborts() {
        let (completer, completion) = pair::<u32>();
        drop(completer);
        assert_eq!(completion.wait(), Err(BridgeError::Aborted));
    }

    #[test]
    fn timeout_hands_completion_back() {
        let (completer, completion) = pair::<&str>();
        let completion = completion
            .wait_timeout(Duration::from_millis(10))
            .expect_err("nothing sent yet");
        assert!(completion.try_take().is_none());

        completer.succeed("done");
        assert_eq!(completion.wait_timeout(Duration::from_secs(1)).ok(), Some(Ok("done")));
    }

    #[test]
    fn completing_after_receiver_dropped_is_harmless() {
        let (completer, completion) = pair::<u8>();
        drop(completion);
        completer.succeed(1);
    }
}
