use std::sync::Arc;

use efference_cloud::{CloudFrontSigner, ObjectStore};

use crate::config::ServeConfig;

/// Shared state for the dataset handlers.
#[derive(Clone)]
pub struct ServeState {
    pub config: Arc<ServeConfig>,
    /// Store bound to the dataset bucket.
    pub store: Arc<dyn ObjectStore>,
    /// Present only when the CDN domain and its key pair are both configured.
    pub cloudfront: Option<Arc<CloudFrontSigner>>,
}

/// Build the CloudFront signer described by `config`.
///
/// Returns `None` when any of domain, key pair id or key path is missing, or
/// when the key cannot be loaded; downloads then fall back to S3 presigning.
pub fn load_cloudfront_signer(config: &ServeConfig) -> Option<CloudFrontSigner> {
    let (Some(_), Some(key_pair_id), Some(key_path)) = (
        config.cloudfront_domain.as_ref(),
        config.cloudfront_key_pair_id.as_ref(),
        config.cloudfront_private_key_path.as_ref(),
    ) else {
        return None;
    };

    match CloudFrontSigner::from_pem_file(key_pair_id.as_str(), key_path) {
        Ok(signer) => Some(signer),
        Err(e) => {
            tracing::warn!(error = %e, "CloudFront signer unavailable; using S3 presigned URLs");
            None
        }
    }
}
