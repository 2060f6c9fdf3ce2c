use std::time::Duration;

use async_trait::async_trait;
use efference_core::types::Timestamp;
use serde::Serialize;

use crate::error::StorageError;

/// One part of a multipart upload as reported by the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    pub part_number: i32,
    pub etag: String,
}

/// Result of completing a multipart upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedUpload {
    pub location: Option<String>,
    pub etag: Option<String>,
}

/// One stored object from a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<Timestamp>,
}

/// Result of listing a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Sub-prefixes rolled up by the delimiter, each ending in the delimiter.
    pub common_prefixes: Vec<String>,
    pub objects: Vec<ObjectSummary>,
}

/// Storage operations used by the upload and dataset endpoints.
///
/// Presigned URLs let clients talk to the bucket directly; the service
/// itself never streams object bodies.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store writes to.
    fn bucket(&self) -> &str;

    /// Presigned `PUT` for a single object. `metadata` is sent as
    /// `x-amz-meta-*` headers and must be echoed by the uploader.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        metadata: &[(&str, String)],
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Presigned `GET` for a single object.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;

    /// Start a multipart upload and return its upload id.
    async fn create_multipart(&self, key: &str, content_type: &str)
        -> Result<String, StorageError>;

    /// Presigned `PUT` for one part of a multipart upload.
    async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Assemble the uploaded parts. Parts may be given in any order.
    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[UploadedPart],
    ) -> Result<CompletedUpload, StorageError>;

    /// Abort a multipart upload and discard its parts.
    async fn abort_multipart(&self, key: &str, upload_id: &str) -> Result<(), StorageError>;

    /// List everything under `prefix`, following continuation tokens.
    /// With a delimiter, deeper keys are rolled up into `common_prefixes`.
    async fn list(&self, prefix: &str, delimiter: Option<&str>) -> Result<Listing, StorageError>;
}

/// Parts in ascending part-number order, as S3 requires on completion.
pub fn sorted_parts(parts: &[UploadedPart]) -> Vec<UploadedPart> {
    let mut sorted = parts.to_vec();
    sorted.sort_by_key(|p| p.part_number);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(n: i32) -> UploadedPart {
        UploadedPart {
            part_number: n,
            etag: format!("\"etag-{n}\""),
        }
    }

    #[test]
    fn parts_are_sorted_by_number() {
        let sorted = sorted_parts(&[part(3), part(1), part(2)]);
        let numbers: Vec<i32> = sorted.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(sorted[0].etag, "\"etag-1\"");
    }
}
