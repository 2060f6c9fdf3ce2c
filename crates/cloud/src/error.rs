/// Errors raised by an [`ObjectStore`](crate::ObjectStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The presigning configuration was rejected (e.g. expiry too long).
    #[error("Invalid presigning configuration: {0}")]
    Presign(String),

    /// A storage API call failed.
    #[error("Storage operation {operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    /// The service answered without a field the caller depends on.
    #[error("Storage operation {operation} returned no {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
}

impl StorageError {
    pub(crate) fn request<E: std::error::Error>(operation: &'static str, err: E) -> Self {
        StorageError::Request {
            operation,
            message: aws_sdk_s3::error::DisplayErrorContext(&err).to_string(),
        }
    }
}
