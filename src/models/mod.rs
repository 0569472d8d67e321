//! Data transfer objects (DTOs) for API responses.
//!
//! These structs are serialized to JSON for frontend consumption.
//! - `commit`: CommitSummary, CommitDetail, FileLineCount
//! - `dataset`: DatasetInfo, LoadDatasetRequest
//! - `view`: TimelineView and every panel it carries (marks, stats, files,
//!   categories, selection, range control, tooltip)

pub mod commit;
pub mod dataset;
pub mod view;

pub use commit::*;
pub use dataset::*;
pub use view::*;
