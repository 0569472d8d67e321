//! Snapshot DTOs for everything on screen.
//!
//! - `TimelineView`: one consistent snapshot of every panel, built from a
//!   single recompute pass of the controller
//! - `MarkView`, `TooltipView`, `AxisTick`: scatter plot scene
//! - `StatsPanel`, `FileEntry`, `CategoryEntry`: summary panels
//! - `SelectionSummary`, `CategoryShare`: brush selection breakdown
//! - `RangeControlState`, `CursorView`, `NarrativeCheckpointView`: inputs
//!
//! Used by: JSON API, server-rendered page, SVG plot

use serde::{Deserialize, Serialize};

/// Screen-space position in plot pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkView {
    pub commit_id: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: String,
    pub opacity: f64,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TooltipView {
    pub visible: bool,
    pub commit_id: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CursorView {
    pub time: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeControlState {
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub fill_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatItem {
    pub label: &'static str,
    pub value: String,
}

/// Stats box. Missing metrics (unparseable cells) are skipped by the maxima,
/// so a max is `None` only when every contributing cell was missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsPanel {
    pub commits: usize,
    pub files: usize,
    pub total_lines: usize,
    pub max_depth: Option<u32>,
    pub max_line_length: Option<u32>,
    pub max_file_lines: Option<usize>,
}

impl StatsPanel {
    pub fn items(&self) -> Vec<StatItem> {
        fn or_zero<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "0".to_string())
        }

        vec![
            StatItem { label: "COMMITS", value: self.commits.to_string() },
            StatItem { label: "FILES", value: self.files.to_string() },
            StatItem { label: "TOTAL LOC", value: self.total_lines.to_string() },
            StatItem { label: "MAX DEPTH", value: or_zero(self.max_depth) },
            StatItem { label: "LONGEST LINE", value: or_zero(self.max_line_length) },
            StatItem { label: "MAX LINES", value: or_zero(self.max_file_lines) },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileDot {
    pub category: String,
    pub color: String,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub lines: usize,
    pub dots: Vec<FileDot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub category: String,
    pub lines: usize,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub lines: usize,
    pub fraction: f64,
    pub percent: String,
}

/// A selection rectangle translated back into data space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataWindow {
    pub from: String,
    pub to: String,
    pub hour_low: f64,
    pub hour_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub active: bool,
    pub count: usize,
    pub label: String,
    pub commit_ids: Vec<String>,
    pub breakdown: Vec<CategoryShare>,
    pub window: Option<DataWindow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NarrativeCheckpointView {
    pub commit_id: String,
    pub top: f64,
    pub height: f64,
    pub text: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineView {
    pub source: String,
    pub error: Option<String>,
    pub cursor: Option<CursorView>,
    pub range: Option<RangeControlState>,
    pub total_commits: usize,
    pub visible_commits: usize,
    pub x_axis: Vec<AxisTick>,
    pub y_axis: Vec<AxisTick>,
    pub marks: Vec<MarkView>,
    pub tooltip: TooltipView,
    pub stats: StatsPanel,
    pub stat_items: Vec<StatItem>,
    pub files: Vec<FileEntry>,
    pub categories: Vec<CategoryEntry>,
    pub selection: SelectionSummary,
    pub narrative_active: Option<String>,
}

impl TimelineView {
    /// Empty snapshot shown when no dataset could be loaded.
    pub fn placeholder(source: &str, reason: &str) -> Self {
        let stats = StatsPanel::default();
        Self {
            source: source.to_string(),
            error: Some(reason.to_string()),
            cursor: None,
            range: None,
            total_commits: 0,
            visible_commits: 0,
            x_axis: Vec::new(),
            y_axis: Vec::new(),
            marks: Vec::new(),
            tooltip: TooltipView::default(),
            stat_items: stats.items(),
            stats,
            files: Vec::new(),
            categories: Vec::new(),
            selection: SelectionSummary::empty(),
            narrative_active: None,
        }
    }
}

impl SelectionSummary {
    pub fn empty() -> Self {
        Self {
            active: false,
            count: 0,
            label: "No commits selected".to_string(),
            commit_ids: Vec::new(),
            breakdown: Vec::new(),
            window: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats_render_zero_state() {
        let items = StatsPanel::default().items();
        assert_eq!(items.len(), 6);
        assert!(items.iter().all(|item| item.value == "0"));
        assert_eq!(items[2].label, "TOTAL LOC");
    }

    #[test]
    fn test_placeholder_carries_error() {
        let view = TimelineView::placeholder("loc.csv", "file not found");
        assert_eq!(view.error.as_deref(), Some("file not found"));
        assert!(view.marks.is_empty());
        assert_eq!(view.selection.label, "No commits selected");
    }
}
