//! Dataset listing and structure.
//!
//! A dataset is a directory under the configured prefix. Its structure is
//! read from a single recursive listing and split into manifests, shards
//! and meta files by path.

use axum::extract::{Path, State};
use axum::Json;
use efference_cloud::ObjectSummary;
use efference_core::datasets::{
    classify, join_key, name_from_common_prefix, root_dataset_name, validate_dataset_name,
    DatasetSection,
};
use efference_core::types::Timestamp;
use serde::Serialize;

use crate::error::{ServeError, ServeResult};
use crate::state::ServeState;

#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct DatasetFile {
    pub key: String,
    pub relative_path: String,
    pub size: i64,
    pub last_modified: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct ShardFile {
    #[serde(flatten)]
    pub file: DatasetFile,
    pub shard_type: String,
}

#[derive(Debug, Serialize)]
pub struct DatasetStructure {
    pub name: String,
    pub manifests: Vec<DatasetFile>,
    pub shards: Vec<ShardFile>,
    pub meta: Vec<DatasetFile>,
    /// Bytes across every object in the dataset, including unclassified ones.
    pub total_size: i64,
}

/// GET /datasets
///
/// Immediate sub-directories of the prefix are the datasets. A prefix with
/// files but no sub-directories is itself the only dataset.
pub async fn list_datasets(State(state): State<ServeState>) -> ServeResult<Json<Vec<DatasetInfo>>> {
    let root = &state.config.dataset_prefix;
    let listing = state
        .store
        .list(&format!("{root}/"), Some("/"))
        .await?;

    let mut datasets: Vec<DatasetInfo> = listing
        .common_prefixes
        .iter()
        .filter_map(|prefix| {
            name_from_common_prefix(prefix, root).map(|name| DatasetInfo {
                name,
                path: prefix.trim_end_matches('/').to_string(),
            })
        })
        .collect();

    if datasets.is_empty() && !listing.objects.is_empty() {
        datasets.push(DatasetInfo {
            name: root_dataset_name(root),
            path: root.clone(),
        });
    }

    tracing::debug!(count = datasets.len(), "Listed datasets");
    Ok(Json(datasets))
}

/// GET /datasets/{name}
pub async fn get_dataset(
    State(state): State<ServeState>,
    Path(name): Path<String>,
) -> ServeResult<Json<DatasetStructure>> {
    validate_dataset_name(&name).map_err(ServeError::BadRequest)?;

    let dataset_prefix = format!("{}/", join_key(&state.config.dataset_prefix, &name));
    let listing = state.store.list(&dataset_prefix, None).await?;
    if listing.objects.is_empty() {
        return Err(ServeError::NotFound(format!("Dataset '{name}' not found")));
    }

    let structure = build_structure(name, &dataset_prefix, listing.objects);
    tracing::debug!(
        dataset = %structure.name,
        manifests = structure.manifests.len(),
        shards = structure.shards.len(),
        meta = structure.meta.len(),
        "Loaded dataset structure",
    );
    Ok(Json(structure))
}

fn build_structure(name: String, dataset_prefix: &str, objects: Vec<ObjectSummary>) -> DatasetStructure {
    let mut structure = DatasetStructure {
        name,
        manifests: Vec::new(),
        shards: Vec::new(),
        meta: Vec::new(),
        total_size: 0,
    };

    for object in objects {
        structure.total_size += object.size;
        let relative_path = object
            .key
            .strip_prefix(dataset_prefix)
            .unwrap_or(&object.key)
            .to_string();
        let section = classify(&relative_path);
        let file = DatasetFile {
            key: object.key,
            relative_path,
            size: object.size,
            last_modified: object.last_modified,
        };
        match section {
            DatasetSection::Manifest => structure.manifests.push(file),
            DatasetSection::Meta => structure.meta.push(file),
            // Files sitting directly in `shards/` have no type and are skipped.
            DatasetSection::Shard { shard_type } if !shard_type.is_empty() => {
                structure.shards.push(ShardFile { file, shard_type });
            }
            DatasetSection::Shard { .. } | DatasetSection::Other => {}
        }
    }

    structure
}
