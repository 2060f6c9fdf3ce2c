//! Object storage for session uploads and dataset downloads.
//!
//! - [`ObjectStore`]: the storage seam handlers depend on.
//! - [`S3ObjectStore`]: the AWS S3 (or S3-compatible) implementation.
//! - [`S3Config`]: connection settings loaded from the environment.
//! - [`CloudFrontSigner`]: signed CDN download links.

pub mod cloudfront;
pub mod config;
pub mod error;
pub mod s3;
pub mod store;

pub use cloudfront::CloudFrontSigner;
pub use config::S3Config;
pub use error::StorageError;
pub use s3::S3ObjectStore;
pub use store::{CompletedUpload, Listing, ObjectStore, ObjectSummary, UploadedPart};
