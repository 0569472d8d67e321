use chrono::{DateTime, FixedOffset};

/// One changed source line, attributed to a commit, file and category.
///
/// Numeric metrics are `None` when their cell could not be parsed; the load
/// carries on and aggregations skip the gap.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub commit_id: String,
    pub file: String,
    pub filename: String,
    pub category: String,
    pub line_number: Option<u32>,
    pub indent_depth: Option<u32>,
    pub line_length: Option<u32>,
    pub author: String,
    pub date: String,
    pub time: String,
    pub timezone: String,
    pub authored_at: DateTime<FixedOffset>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Builds a record authored at `datetime` (RFC 3339) with sane defaults.
    pub fn line(commit: &str, file: &str, category: &str, datetime: &str) -> LineRecord {
        let authored_at = DateTime::parse_from_rfc3339(datetime).expect("valid RFC 3339");
        LineRecord {
            commit_id: commit.to_string(),
            file: file.to_string(),
            filename: file.rsplit('/').next().unwrap_or(file).to_string(),
            category: category.to_string(),
            line_number: Some(1),
            indent_depth: Some(0),
            line_length: Some(10),
            author: "ada".to_string(),
            date: authored_at.format("%Y-%m-%d").to_string(),
            time: authored_at.format("%H:%M:%S").to_string(),
            timezone: authored_at.format("%:z").to_string(),
            authored_at,
        }
    }
}
