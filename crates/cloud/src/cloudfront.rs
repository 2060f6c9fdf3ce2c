//! Signed CloudFront URLs (canned policy).
//!
//! The policy restricts one URL until an expiry time and is signed with
//! the distribution key pair's RSA private key (PKCS#1 v1.5 over SHA-1).

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use efference_core::types::Timestamp;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha1::Sha1;

use crate::error::StorageError;

/// Signs CloudFront URLs for one key pair.
#[derive(Clone)]
pub struct CloudFrontSigner {
    key_pair_id: String,
    signing_key: SigningKey<Sha1>,
}

impl std::fmt::Debug for CloudFrontSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudFrontSigner")
            .field("key_pair_id", &self.key_pair_id)
            .finish_non_exhaustive()
    }
}

impl CloudFrontSigner {
    /// Build a signer from a PEM private key (PKCS#8 or PKCS#1).
    pub fn from_pem(key_pair_id: impl Into<String>, pem: &str) -> Result<Self, StorageError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| StorageError::Presign(format!("invalid CloudFront private key: {e}")))?;
        Ok(Self {
            key_pair_id: key_pair_id.into(),
            signing_key: SigningKey::<Sha1>::new(private_key),
        })
    }

    /// Read the PEM key from disk.
    pub fn from_pem_file(
        key_pair_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let pem = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Presign(format!(
                "cannot read CloudFront private key {}: {e}",
                path.display()
            ))
        })?;
        Self::from_pem(key_pair_id, &pem)
    }

    pub fn key_pair_id(&self) -> &str {
        &self.key_pair_id
    }

    /// Sign `url` so it is only valid before `expires_at`.
    pub fn sign_url(&self, url: &str, expires_at: Timestamp) -> Result<String, StorageError> {
        let expires = expires_at.timestamp();
        let policy = canned_policy(url, expires);
        let signature = self
            .signing_key
            .try_sign(policy.as_bytes())
            .map_err(|e| StorageError::Presign(format!("CloudFront signing failed: {e}")))?;

        let separator = if url.contains('?') { '&' } else { '?' };
        Ok(format!(
            "{url}{separator}Expires={expires}&Signature={}&Key-Pair-Id={}",
            url_safe(&STANDARD.encode(signature.to_bytes())),
            self.key_pair_id
        ))
    }
}

fn canned_policy(url: &str, expires: i64) -> String {
    format!(
        r#"{{"Statement":[{{"Resource":"{url}","Condition":{{"DateLessThan":{{"AWS:EpochTime":{expires}}}}}}}]}}"#
    )
}

/// CloudFront's query-safe base64 alphabet.
fn url_safe(encoded: &str) -> String {
    encoded
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    const TEST_KEY: &str = include_str!("../testdata/cloudfront_key.pem");
    const URL: &str = "https://d111.cloudfront.net/vlm/datasets/kitchen/meta/stats.json";

    #[test]
    fn canned_policy_is_compact_json() {
        assert_eq!(
            canned_policy("https://cdn.test/a.tar", 42),
            r#"{"Statement":[{"Resource":"https://cdn.test/a.tar","Condition":{"DateLessThan":{"AWS:EpochTime":42}}}]}"#
        );
    }

    #[test]
    fn signed_url_matches_reference_signature() {
        let signer = CloudFrontSigner::from_pem("K2JCJMDEHXQW5F", TEST_KEY).unwrap();
        let expires_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let signed = signer.sign_url(URL, expires_at).unwrap();

        // Reference value from `openssl dgst -sha1 -sign` over the same policy.
        let expected_signature = "oYBCiioCxUq2kHRXxiEn5M~HCb0x0y1iMfIaFiRzXPg6~ntDEjgyE337HSk2eOGy8K2PdXUG5dDb2DznF1Ic2AvnJN3YJKEsnYOSBj1w0mVqb~a-o36-orQwhA5yQXIrjfr5cAhFB34n4rPEqezEWmmrxzosycN-0u--alDtzL8_";
        assert_eq!(
            signed,
            format!("{URL}?Expires=1767225600&Signature={expected_signature}&Key-Pair-Id=K2JCJMDEHXQW5F")
        );
    }

    #[test]
    fn existing_query_string_is_extended() {
        let signer = CloudFrontSigner::from_pem("KID", TEST_KEY).unwrap();
        let signed = signer
            .sign_url("https://cdn.test/a.tar?v=2", Utc::now())
            .unwrap();
        assert!(signed.starts_with("https://cdn.test/a.tar?v=2&Expires="));
        assert!(signed.ends_with("&Key-Pair-Id=KID"));
    }

    #[test]
    fn garbage_key_is_rejected() {
        let err = CloudFrontSigner::from_pem("KID", "not a key").unwrap_err();
        assert!(matches!(err, StorageError::Presign(_)));
    }

    #[test]
    fn missing_key_file_is_rejected() {
        let err = CloudFrontSigner::from_pem_file("KID", "/nonexistent/cf.pem").unwrap_err();
        assert!(matches!(err, StorageError::Presign(_)));
    }
}
