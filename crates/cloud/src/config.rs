/// Default region when `AWS_REGION` is not set.
const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, LocalStack). Enables path-style addressing.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Load the API's upload bucket configuration.
    ///
    /// | Env Var                 | Default     |
    /// |-------------------------|-------------|
    /// | `S3_BUCKET`             | (required)  |
    /// | `AWS_REGION`            | `us-east-1` |
    /// | `S3_ENDPOINT`           | unset       |
    /// | `AWS_ACCESS_KEY_ID`     | unset       |
    /// | `AWS_SECRET_ACCESS_KEY` | unset       |
    ///
    /// Without an access key pair the default AWS credential chain is used.
    ///
    /// # Panics
    ///
    /// Panics if `S3_BUCKET` is not set.
    pub fn from_env() -> Self {
        let bucket = std::env::var("S3_BUCKET").expect("S3_BUCKET must be set");
        Self::for_bucket(bucket)
    }

    /// Load everything except the bucket name from the environment.
    pub fn for_bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.into()),
            endpoint: non_empty_var("S3_ENDPOINT"),
            access_key_id: non_empty_var("AWS_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("AWS_SECRET_ACCESS_KEY"),
        }
    }

    /// The static key pair, if both halves are configured.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
