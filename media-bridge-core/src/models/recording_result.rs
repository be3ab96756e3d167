use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::blob::{Blob, BlobReference};

/// Result delivered when a recording session stops successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub reference: BlobReference,
    pub size_bytes: u64,
    pub chunk_count: usize,
    pub duration_secs: f64,
    pub checksum: String,
    pub metadata: RecordingMetadata,
}

/// Metadata describing a finished recording.
///
/// Serializable for JSON export to the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub chunk_count: usize,
    pub duration_secs: f64,
    pub checksum: String,
    pub created_at: String,
}

impl RecordingMetadata {
    pub fn for_blob(blob: &Blob, chunk_count: usize, duration_secs: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mime_type: blob.mime_type.clone(),
            size_bytes: blob.size() as u64,
            chunk_count,
            duration_secs,
            checksum: sha256_hex(&blob.data),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl RecordingResult {
    pub fn new(reference: BlobReference, metadata: RecordingMetadata) -> Self {
        Self {
            reference,
            size_bytes: metadata.size_bytes,
            chunk_count: metadata.chunk_count,
            duration_secs: metadata.duration_secs,
            checksum: metadata.checksum.clone(),
            metadata,
        }
    }
}

/// SHA-256 hex digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_of_empty_input() {
        assert_eq!(
            sha256_hex(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn metadata_describes_blob() {
        let blob = Blob::new(vec![1u8; 35], "audio/webm");
        let metadata = RecordingMetadata::for_blob(&blob, 3, 1.5);

        assert_eq!(metadata.size_bytes, 35);
        assert_eq!(metadata.chunk_count, 3);
        assert_eq!(metadata.mime_type, "audio/webm");
        assert_eq!(metadata.checksum, sha256_hex(&blob.data));
        assert!(uuid::Uuid::parse_str(&metadata.id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&metadata.created_at).is_ok());

        let result = RecordingResult::new(BlobReference::from("blob:test/1"), metadata);
        assert_eq!(result.size_bytes, 35);
        assert_eq!(result.checksum, result.metadata.checksum);
    }

    #[test]
    fn metadata_json_roundtrips_fields() {
        let blob = Blob::new(vec![9u8; 4], "audio/ogg");
        let metadata = RecordingMetadata::for_blob(&blob, 1, 0.25);
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["mime_type"], "audio/ogg");
        assert_eq!(json["size_bytes"], 4);
    }
}
