#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use efference_api::auth::jwt::{generate_access_token, JwtConfig};
use efference_api::auth::password::hash_password;
use efference_api::config::ServerConfig;
use efference_api::router::build_app_router;
use efference_api::state::AppState;
use efference_cloud::{
    CompletedUpload, Listing, ObjectStore, StorageError, UploadedPart,
};
use efference_db::models::user::{CreateUser, User};
use efference_db::repositories::UserRepo;
use efference_events::{EmailError, Mailer, OutgoingEmail};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test_password_123";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_url_expiry_secs: 3600,
        stripe_webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        app_base_url: "https://app.test".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// In-memory object store that fabricates URLs and records every call.
#[derive(Default)]
pub struct StubStore {
    pub calls: Mutex<Vec<String>>,
    pub fail: bool,
}

impl StubStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
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

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for StubStore {
    fn bucket(&self) -> &str {
        "test-bucket"
    }

    async fn presign_put(
        &self,
        key: &str,
        _content_type: &str,
        _metadata: &[(&str, String)],
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        self.record("presign_put", key)?;
        Ok(format!(
            "https://test-bucket.s3.test/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    async fn presign_get(&self, key: &str, _expires_in: Duration) -> Result<String, StorageError> {
        self.record("presign_get", key)?;
        Ok(format!("https://test-bucket.s3.test/{key}?signed"))
    }

    async fn create_multipart(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.record("create_multipart", key)?;
        Ok("upload-123".to_string())
    }

    async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        _expires_in: Duration,
    ) -> Result<String, StorageError> {
        self.record("presign_upload_part", key)?;
        Ok(format!(
            "https://test-bucket.s3.test/{key}?uploadId={upload_id}&partNumber={part_number}"
        ))
    }

    async fn complete_multipart(
        &self,
        key: &str,
        _upload_id: &str,
        _parts: &[UploadedPart],
    ) -> Result<CompletedUpload, StorageError> {
        self.record("complete_multipart", key)?;
        Ok(CompletedUpload {
            location: Some(format!("https://test-bucket.s3.test/{key}")),
            etag: Some("\"final-etag\"".to_string()),
        })
    }

    async fn abort_multipart(&self, key: &str, _upload_id: &str) -> Result<(), StorageError> {
        self.record("abort_multipart", key)
    }

    async fn list(&self, prefix: &str, _delimiter: Option<&str>) -> Result<Listing, StorageError> {
        self.record("list", prefix)?;
        Ok(Listing::default())
    }
}

/// Mailer that keeps outgoing messages in memory.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Build("stubbed delivery failure".into()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Full application router with a stub store and no mailer.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(StubStore::default()), None)
}

/// Full application router with caller-supplied test doubles.
pub fn build_test_app_with(
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
    mailer: Option<Arc<dyn Mailer>>,
) -> Router {
    build_test_app_with_config(pool, test_config(), store, mailer)
}

pub fn build_test_app_with_config(
    pool: PgPool,
    config: ServerConfig,
    store: Arc<dyn ObjectStore>,
    mailer: Option<Arc<dyn Mailer>>,
) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        mailer,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and return it with a valid token.
pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{name}@test.com"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role: role.to_string(),
            is_invited: false,
        },
    )
    .await
    .expect("user creation should succeed");
    let token = token_for(&user);
    (user, token)
}

pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}
