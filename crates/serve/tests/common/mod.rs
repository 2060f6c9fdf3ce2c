#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use efference_cloud::{
    CompletedUpload, Listing, ObjectStore, ObjectSummary, StorageError, UploadedPart,
};
use efference_serve::config::ServeConfig;
use efference_serve::router::build_router;
use efference_serve::state::{load_cloudfront_signer, ServeState};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const ROOT: &str = "vlm/datasets";

pub fn test_config() -> ServeConfig {
    ServeConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        bucket: "test-datasets".to_string(),
        dataset_prefix: ROOT.to_string(),
        cloudfront_domain: None,
        cloudfront_key_pair_id: None,
        cloudfront_private_key_path: None,
        presigned_url_expiry_secs: 3600,
    }
}

/// Read-only store over a fixed set of keys.
///
/// `list` answers like S3: with a delimiter, keys below the next `/` are
/// folded into common prefixes.
#[derive(Default)]
pub struct FakeBucket {
    pub objects: Vec<ObjectSummary>,
    pub calls: Mutex<Vec<String>>,
    pub fail: bool,
}

impl FakeBucket {
    pub fn with_keys(keys: &[(&str, i64)]) -> Self {
        Self {
            objects: keys
                .iter()
                .map(|(key, size)| ObjectSummary {
                    key: key.to_string(),
                    size: *size,
                    last_modified: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, key: &str) -> Result<(), StorageError> {
        self.calls.lock().unwrap().push(format!("{operation} {key}"));
        if self.fail {
            return Err(StorageError::Request {
                operation,
                message: "stubbed failure".into(),
            });
        }
        Ok(())
    }

    fn unsupported(operation: &'static str) -> StorageError {
        StorageError::Request {
            operation,
            message: "read-only bucket".into(),
        }
    }
}

#[async_trait]
impl ObjectStore for FakeBucket {
    fn bucket(&self) -> &str {
        "test-datasets"
    }

    async fn presign_put(
        &self,
        _key: &str,
        _content_type: &str,
        _metadata: &[(&str, String)],
        _expires_in: Duration,
    ) -> Result<String, StorageError> {
        Err(Self::unsupported("presign_put"))
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        self.record("presign_get", key)?;
        Ok(format!(
            "https://test-datasets.s3.test/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    async fn create_multipart(&self, _key: &str, _content_type: &str) -> Result<String, StorageError> {
        Err(Self::unsupported("create_multipart"))
    }

    async fn presign_upload_part(
        &self,
        _key: &str,
        _upload_id: &str,
        _part_number: i32,
        _expires_in: Duration,
    ) -> Result<String, StorageError> {
        Err(Self::unsupported("presign_upload_part"))
    }

    async fn complete_multipart(
        &self,
        _key: &str,
        _upload_id: &str,
        _parts: &[UploadedPart],
    ) -> Result<CompletedUpload, StorageError> {
        Err(Self::unsupported("complete_multipart"))
    }

    async fn abort_multipart(&self, _key: &str, _upload_id: &str) -> Result<(), StorageError> {
        Err(Self::unsupported("abort_multipart"))
    }

    async fn list(&self, prefix: &str, delimiter: Option<&str>) -> Result<Listing, StorageError> {
        self.record("list", prefix)?;
        let mut listing = Listing::default();
        for object in self.objects.iter().filter(|o| o.key.starts_with(prefix)) {
            let rest = &object.key[prefix.len()..];
            match delimiter.and_then(|d| rest.find(d).map(|i| i + d.len())) {
                Some(end) => {
                    let common = format!("{prefix}{}", &rest[..end]);
                    if !listing.common_prefixes.contains(&common) {
                        listing.common_prefixes.push(common);
                    }
                }
                None => listing.objects.push(object.clone()),
            }
        }
        Ok(listing)
    }
}

/// Config with a CloudFront domain and the checked-in test key pair.
pub fn cloudfront_config() -> ServeConfig {
    ServeConfig {
        cloudfront_domain: Some("d111.cloudfront.net".to_string()),
        cloudfront_key_pair_id: Some("K2JCJMDEHXQW5F".to_string()),
        cloudfront_private_key_path: Some(format!(
            "{}/../cloud/testdata/cloudfront_key.pem",
            env!("CARGO_MANIFEST_DIR")
        )),
        ..test_config()
    }
}

pub fn build_test_app(store: Arc<dyn ObjectStore>) -> Router {
    build_test_app_with_config(test_config(), store)
}

pub fn build_test_app_with_config(config: ServeConfig, store: Arc<dyn ObjectStore>) -> Router {
    let state = ServeState {
        config: Arc::new(config.clone()),
        store,
        cloudfront: load_cloudfront_signer(&config).map(Arc::new),
    };
    build_router(state, &config)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}
