//! [`ObjectStore`] backed by the AWS S3 SDK.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use efference_core::types::Timestamp;

use crate::config::S3Config;
use crate::error::StorageError;
use crate::store::{sorted_parts, CompletedUpload, Listing, ObjectStore, ObjectSummary, UploadedPart};

/// S3 client bound to one bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build a client from `config`.
    ///
    /// Static credentials are used when both keys are set; otherwise the
    /// default provider chain (env, profile, instance role) applies.
    pub async fn connect(config: &S3Config) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let Some((id, secret)) = config.static_credentials() {
            loader = loader.credentials_provider(Credentials::new(id, secret, None, None, "static"));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            "S3 object store configured",
        );

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        }
    }
}

fn presigning(expires_in: Duration) -> Result<PresigningConfig, StorageError> {
    PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::Presign(e.to_string()))
}

fn to_timestamp(value: &aws_sdk_s3::primitives::DateTime) -> Option<Timestamp> {
    chrono::DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        metadata: &[(&str, String)],
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type);
        for (name, value) in metadata {
            request = request.metadata(*name, value);
        }
        let presigned = request
            .presigned(presigning(expires_in)?)
            .await
            .map_err(|e| StorageError::request("put_object", e))?;
        Ok(presigned.uri().to_string())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning(expires_in)?)
            .await
            .map_err(|e| StorageError::request("get_object", e))?;
        Ok(presigned.uri().to_string())
    }

    async fn create_multipart(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let output = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::request("create_multipart_upload", e))?;

        output
            .upload_id()
            .map(str::to_string)
            .ok_or(StorageError::MissingField {
                operation: "create_multipart_upload",
                field: "upload_id",
            })
    }

    async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigned = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .presigned(presigning(expires_in)?)
            .await
            .map_err(|e| StorageError::request("upload_part", e))?;
        Ok(presigned.uri().to_string())
    }

    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[UploadedPart],
    ) -> Result<CompletedUpload, StorageError> {
        let completed_parts: Vec<CompletedPart> = sorted_parts(parts)
            .into_iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number)
                    .e_tag(p.etag)
                    .build()
            })
            .collect();

        let output = self
            .client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed_parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| StorageError::request("complete_multipart_upload", e))?;

        Ok(CompletedUpload {
            location: output.location().map(str::to_string),
            etag: output.e_tag().map(str::to_string),
        })
    }

    async fn abort_multipart(&self, key: &str, upload_id: &str) -> Result<(), StorageError> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| StorageError::request("abort_multipart_upload", e))?;
        Ok(())
    }

    async fn list(&self, prefix: &str, delimiter: Option<&str>) -> Result<Listing, StorageError> {
        let mut listing = Listing::default();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_delimiter(delimiter.map(str::to_string))
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::request("list_objects_v2", e))?;

            listing.common_prefixes.extend(
                output
                    .common_prefixes()
                    .iter()
                    .filter_map(|cp| cp.prefix().map(str::to_string)),
            );
            listing
                .objects
                .extend(output.contents().iter().filter_map(|obj| {
                    Some(ObjectSummary {
                        key: obj.key()?.to_string(),
                        size: obj.size().unwrap_or(0),
                        last_modified: obj.last_modified().and_then(to_timestamp),
                    })
                }));

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        tracing::debug!(
            prefix,
            prefixes = listing.common_prefixes.len(),
            objects = listing.objects.len(),
            "Listed objects",
        );
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_datetime_converts_to_utc() {
        let dt = aws_sdk_s3::primitives::DateTime::from_secs(1_700_000_000);
        let ts = to_timestamp(&dt).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn presigning_rejects_over_a_week() {
        assert!(presigning(Duration::from_secs(3600)).is_ok());
        assert!(presigning(Duration::from_secs(8 * 24 * 3600)).is_err());
    }
}
