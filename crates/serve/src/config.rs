/// Dataset service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Bucket holding the datasets.
    pub bucket: String,
    /// Key prefix under which each dataset is a directory.
    pub dataset_prefix: String,
    /// CDN domain fronting the bucket. Download links point at it only when
    /// a signing key pair is configured too.
    pub cloudfront_domain: Option<String>,
    /// CloudFront public key id used to sign download links.
    pub cloudfront_key_pair_id: Option<String>,
    /// PEM file holding the matching private key.
    pub cloudfront_private_key_path: Option<String>,
    /// Default lifetime of download links in seconds.
    pub presigned_url_expiry_secs: u64,
}

impl ServeConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                                       |
    /// |-----------------------------|-----------------------------------------------|
    /// | `HOST`                      | `0.0.0.0`                                     |
    /// | `PORT`                      | `8000`                                        |
    /// | `CORS_ORIGINS`              | `http://localhost:3000,http://localhost:5173` |
    /// | `DATASET_BUCKET`            | `efference-vlm`                               |
    /// | `DATASET_PREFIX`            | `vlm/dataset_test_s3`                         |
    /// | `CLOUDFRONT_DOMAIN`         | unset                                         |
    /// | `CLOUDFRONT_KEY_PAIR_ID`    | unset                                         |
    /// | `CLOUDFRONT_PRIVATE_KEY_PATH` | unset                                       |
    /// | `PRESIGNED_URL_EXPIRY_SECS` | `3600`                                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let bucket = std::env::var("DATASET_BUCKET").unwrap_or_else(|_| "efference-vlm".into());

        let dataset_prefix = std::env::var("DATASET_PREFIX")
            .unwrap_or_else(|_| "vlm/dataset_test_s3".into())
            .trim_matches('/')
            .to_string();

        let cloudfront_domain = std::env::var("CLOUDFRONT_DOMAIN")
            .ok()
            .map(|d| d.trim().trim_end_matches('/').to_string())
            .filter(|d| !d.is_empty());

        let cloudfront_key_pair_id = non_empty_var("CLOUDFRONT_KEY_PAIR_ID");
        let cloudfront_private_key_path = non_empty_var("CLOUDFRONT_PRIVATE_KEY_PATH");

        let presigned_url_expiry_secs: u64 = std::env::var("PRESIGNED_URL_EXPIRY_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("PRESIGNED_URL_EXPIRY_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            bucket,
            dataset_prefix,
            cloudfront_domain,
            cloudfront_key_pair_id,
            cloudfront_private_key_path,
            presigned_url_expiry_secs,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
