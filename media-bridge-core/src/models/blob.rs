use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle addressing an in-memory binary resource held by the host.
///
/// Valid until released; a reference that is never released leaks the
/// resource behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobReference(String);

impl BlobReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BlobReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for BlobReference {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BlobReference {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A binary resource as held by the host: raw bytes tagged with a media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl Blob {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Concatenate `chunks` in the given order into one blob.
    pub fn from_chunks<I, C>(chunks: I, mime_type: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let mut data = Vec::new();
        for chunk in chunks {
            data.extend_from_slice(chunk.as_ref());
        }
        Self::new(data, mime_type)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Outcome handed to a `fetch_bytes` callback.
///
/// Exactly one of `data` / `error` is populated. The fields are private so
/// the only way to build one is through [`CompletionResult::success`] or
/// [`CompletionResult::failure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    data: Option<Vec<u8>>,
    error: Option<String>,
}

impl CompletionResult {
    pub fn success(data: Vec<u8>) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        // `error` must stay non-empty.
        let message = if message.is_empty() {
            "unknown error".to_string()
        } else {
            message
        };
        Self {
            data: None,
            error: Some(message),
        }
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    pub fn into_result(self) -> Result<Vec<u8>, String> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(error),
            (None, None) => Err("unknown error".to_string()),
        }
    }
}

impl<E: fmt::Display> From<Result<Vec<u8>, E>> for CompletionResult {
    fn from(result: Result<Vec<u8>, E>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
