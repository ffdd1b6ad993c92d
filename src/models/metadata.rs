//! Dataset diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::region::ParentLabels;

/// Optional `metadata` block at the top level of a boundary file.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Feature count as declared by the file, not as loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_features: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "dataQuality")]
    pub quality: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        alias = "extracted_date",
        alias = "downloaded_date"
    )]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetMetadata {
    /// File the regions were loaded from
    pub path: PathBuf,
    pub region_count: usize,
    pub loaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileMetadata>,
}

/// Name and labels of a loaded region, without geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub name: String,
    #[serde(flatten)]
    pub labels: ParentLabels,
}
