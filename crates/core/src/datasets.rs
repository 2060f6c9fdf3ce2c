//! Dataset layout rules for the dataset-serving service.
//!
//! A dataset is a directory under the configured root prefix:
//!
//! ```text
//! {root}/{dataset}/manifests/...
//! {root}/{dataset}/shards/{shard_type}/...
//! {root}/{dataset}/meta/...
//! ```

/// Which part of a dataset an object belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSection {
    Manifest,
    Shard { shard_type: String },
    Meta,
    Other,
}

/// Classify an object by its path relative to the dataset directory.
pub fn classify(relative_path: &str) -> DatasetSection {
    if relative_path.starts_with("manifests/") {
        DatasetSection::Manifest
    } else if let Some(rest) = relative_path.strip_prefix("shards/") {
        let shard_type = rest
            .split_once('/')
            .map(|(first, _)| first)
            .unwrap_or("")
            .to_string();
        DatasetSection::Shard { shard_type }
    } else if relative_path.starts_with("meta/") {
        DatasetSection::Meta
    } else {
        DatasetSection::Other
    }
}

/// Join the root prefix and a relative path with exactly one `/`.
pub fn join_key(root: &str, relative: &str) -> String {
    let root = root.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    if root.is_empty() {
        relative.to_string()
    } else {
        format!("{root}/{relative}")
    }
}

/// Extract a dataset name from a listed common prefix such as
/// `vlm/root/my_dataset/`.
pub fn name_from_common_prefix(common_prefix: &str, root: &str) -> Option<String> {
    let root = format!("{}/", root.trim_end_matches('/'));
    let name = common_prefix.strip_prefix(&root)?.trim_end_matches('/');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Last path segment of the root prefix; used when the root itself is the
/// only dataset.
pub fn root_dataset_name(root: &str) -> String {
    root.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Validate a dataset name taken from the URL path.
pub fn validate_dataset_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.contains('/') || name.contains("..") {
        return Err(format!("Invalid dataset name '{name}'"));
    }
    Ok(())
}

/// Validate a file path requested for download; it must stay inside the root.
pub fn validate_file_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("file_path must not be empty".to_string());
    }
    if path.starts_with('/') {
        return Err("file_path must be relative".to_string());
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err("file_path must not contain '..'".to_string());
    }
    Ok(())
}

/// Object key for a requested download.
///
/// Callers may pass either a full key from a dataset listing (already under
/// `root`) or a path relative to `root`.
pub fn download_key(root: &str, file_path: &str) -> String {
    let root = root.trim_end_matches('/');
    if root.is_empty() || file_path.starts_with(&format!("{root}/")) {
        file_path.to_string()
    } else {
        join_key(root, file_path)
    }
}
