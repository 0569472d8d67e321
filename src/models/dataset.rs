//! Dataset DTOs.
//!
//! - `DatasetInfo`: what was loaded (or why nothing was)
//! - `LoadDatasetRequest`: request body for switching to another CSV
//!
//! Used by: dataset header and the dataset switcher

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub source: String,
    pub loaded: bool,
    pub error: Option<String>,
    pub record_count: usize,
    pub commit_count: usize,
    pub first_commit_at: Option<String>,
    pub last_commit_at: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadDatasetRequest {
    pub path: String,
}
