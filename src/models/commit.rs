use serde::{Deserialize, Serialize};

/// Scalar fields of a commit. This is the only serialized form of a commit;
/// the owned line records never leave the aggregate through it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitSummary {
    pub id: String,
    pub url: String,
    pub author: String,
    pub date: String,
    pub time: String,
    pub timezone: String,
    pub authored_at: String,
    pub hour_of_day: f64,
    pub total_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLineCount {
    pub file: String,
    pub filename: String,
    pub lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(flatten)]
    pub summary: CommitSummary,
    pub files: Vec<FileLineCount>,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitListResponse {
    pub commits: Vec<CommitSummary>,
    pub total: usize,
    pub visible: usize,
}
