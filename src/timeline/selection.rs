//! Brush selection over the plotted marks.
//!
//! A commit is selected when its plotted position, under the current scales,
//! lies inside the drag rectangle (edges included). No region means nothing
//! is selected.

use std::collections::HashMap;

use serde::Deserialize;

use crate::models::{CategoryShare, DataWindow, Point, SelectionSummary};
use crate::timeline::aggregate::Commit;
use crate::timeline::scales::Scales;

/// Drag rectangle in plot pixels with `x0 <= x1` and `y0 <= y1`.
///
/// Accepts either `{x0, y0, x1, y1}` or the brush-style `[[x0, y0], [x1, y1]]`
/// and normalizes the corners, so drags in any direction work.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "RegionInput")]
pub struct SelectionRegion {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegionInput {
    Corners([[f64; 2]; 2]),
    Bounds { x0: f64, y0: f64, x1: f64, y1: f64 },
}

impl From<RegionInput> for SelectionRegion {
    fn from(input: RegionInput) -> Self {
        match input {
            RegionInput::Corners([[x0, y0], [x1, y1]]) => {
                SelectionRegion::new(Point::new(x0, y0), Point::new(x1, y1))
            }
            RegionInput::Bounds { x0, y0, x1, y1 } => {
                SelectionRegion::new(Point::new(x0, y0), Point::new(x1, y1))
            }
        }
    }
}

impl SelectionRegion {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.x0 <= p.x && p.x <= self.x1 && self.y0 <= p.y && p.y <= self.y1
    }

    pub fn is_finite(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1].iter().all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushPhase {
    Start,
    Move,
    End,
}

/// Visible commits whose marks fall inside `region`, in visible order.
pub fn select<'a>(
    region: Option<&SelectionRegion>,
    visible: &[&'a Commit],
    scales: &Scales,
) -> Vec<&'a Commit> {
    let Some(region) = region else {
        return Vec::new();
    };
    visible
        .iter()
        .copied()
        .filter(|commit| region.contains(scales.position(commit)))
        .collect()
}

/// Line counts per category over the subset's lines, in order of first
/// appearance.
pub fn category_breakdown(subset: &[&Commit]) -> Vec<CategoryShare> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut total = 0usize;

    for line in subset.iter().flat_map(|c| c.lines()) {
        total += 1;
        match index.get(line.category.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(line.category.as_str(), counts.len());
                counts.push((line.category.as_str(), 1));
            }
        }
    }

    counts
        .into_iter()
        .map(|(category, lines)| {
            let fraction = lines as f64 / total as f64;
            CategoryShare {
                category: category.to_string(),
                lines,
                fraction,
                percent: format_percent(fraction),
            }
        })
        .collect()
}

/// One decimal place with a trailing `.0` trimmed: `33.3%`, `50%`.
pub fn format_percent(fraction: f64) -> String {
    let formatted = format!("{:.1}", fraction * 100.0);
    let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
    format!("{}%", trimmed)
}

pub fn selection_label(count: usize) -> String {
    match count {
        0 => "No commits selected".to_string(),
        1 => "1 commit selected".to_string(),
        n => format!("{} commits selected", n),
    }
}

/// The region translated back into time and (wrapped) hour bounds.
pub fn data_window(region: &SelectionRegion, scales: &Scales) -> DataWindow {
    DataWindow {
        from: scales.x.invert(region.x0).to_rfc3339(),
        to: scales.x.invert(region.x1).to_rfc3339(),
        // Screen y grows downward, so the bottom edge is the earlier hour.
        hour_low: scales.y.invert(region.y1),
        hour_high: scales.y.invert(region.y0),
    }
}

pub fn summarize_selection(
    region: Option<&SelectionRegion>,
    subset: &[&Commit],
    scales: &Scales,
) -> SelectionSummary {
    let Some(region) = region else {
        return SelectionSummary::empty();
    };
    SelectionSummary {
        active: true,
        count: subset.len(),
        label: selection_label(subset.len()),
        commit_ids: subset.iter().map(|c| c.id.clone()).collect(),
        breakdown: category_breakdown(subset),
        window: Some(data_window(region, scales)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::aggregate::aggregate;
    use crate::timeline::config::ViewConfig;
    use crate::timeline::record::fixtures::line;

    fn commits() -> Vec<Commit> {
        aggregate(vec![
            line("c1", "a.rs", "rs", "2024-05-01T09:00:00+00:00"),
            line("c1", "a.rs", "rs", "2024-05-01T09:00:00+00:00"),
            line("c1", "s.css", "css", "2024-05-01T09:00:00+00:00"),
            line("c2", "a.rs", "rs", "2024-05-02T21:00:00+00:00"),
            line("c3", "i.html", "html", "2024-05-03T15:00:00+00:00"),
        ])
    }

    fn scales(visible: &[&Commit]) -> Scales {
        let cursor = visible.iter().map(|c| c.authored_utc()).max().unwrap();
        Scales::fit(visible, cursor, &ViewConfig::default())
    }

    fn around(p: Point, pad: f64) -> SelectionRegion {
        SelectionRegion::new(Point::new(p.x - pad, p.y - pad), Point::new(p.x + pad, p.y + pad))
    }

    #[test]
    fn test_region_normalizes_corners() {
        let region = SelectionRegion::new(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!((region.x0, region.y0, region.x1, region.y1), (10.0, 20.0, 50.0, 80.0));
        assert!(region.contains(Point::new(10.0, 80.0)));
        assert!(region.contains(Point::new(50.0, 20.0)));
        assert!(!region.contains(Point::new(50.1, 20.0)));
    }

    #[test]
    fn test_region_deserializes_both_shapes() {
        let a: SelectionRegion = serde_json::from_str("[[30, 40], [10, 5]]").unwrap();
        let b: SelectionRegion =
            serde_json::from_str(r#"{"x0": 10, "y0": 5, "x1": 30, "y1": 40}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_region_selects_nothing() {
        let commits = commits();
        let visible: Vec<&Commit> = commits.iter().collect();
        let scales = scales(&visible);

        assert!(select(None, &visible, &scales).is_empty());
        let summary = summarize_selection(None, &[], &scales);
        assert!(!summary.active);
        assert_eq!(summary.label, "No commits selected");
    }

    #[test]
    fn test_zero_area_region_over_no_marks() {
        let commits = commits();
        let visible: Vec<&Commit> = commits.iter().collect();
        let scales = scales(&visible);
        let empty_spot = Point::new(ViewConfig::default().plot_area().left, 300.0);
        let region = SelectionRegion::new(empty_spot, empty_spot);

        let subset = select(Some(&region), &visible, &scales);
        assert!(subset.is_empty());

        let summary = summarize_selection(Some(&region), &subset, &scales);
        assert!(summary.active);
        assert_eq!(summary.label, "No commits selected");
        assert!(summary.breakdown.is_empty());
    }

    #[test]
    fn test_edges_are_inclusive() {
        let commits = commits();
        let visible: Vec<&Commit> = commits.iter().collect();
        let scales = scales(&visible);
        let p = scales.position(&commits[1]);

        let point_region = SelectionRegion::new(p, p);
        let subset = select(Some(&point_region), &visible, &scales);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0].id, "c2");
    }

    #[test]
    fn test_selection_and_breakdown() {
        let commits = commits();
        let visible: Vec<&Commit> = commits.iter().collect();
        let scales = scales(&visible);
        let p1 = scales.position(&commits[0]);
        let p2 = scales.position(&commits[1]);
        let region = SelectionRegion::new(p1, p2);

        let subset = select(Some(&region), &visible, &scales);
        let ids: Vec<&str> = subset.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);

        let summary = summarize_selection(Some(&region), &subset, &scales);
        assert_eq!(summary.label, "2 commits selected");
        assert_eq!(summary.breakdown.len(), 2);
        assert_eq!(summary.breakdown[0].category, "rs");
        assert_eq!(summary.breakdown[0].lines, 3);
        assert_eq!(summary.breakdown[0].percent, "75%");
        assert_eq!(summary.breakdown[1].category, "css");
        assert_eq!(summary.breakdown[1].percent, "25%");

        let window = summary.window.unwrap();
        assert!(window.hour_low <= 9.0 + 1e-6 && window.hour_high >= 21.0 - 1e-6);
    }

    #[test]
    fn test_region_outside_plot_is_valid_and_empty() {
        let commits = commits();
        let visible: Vec<&Commit> = commits.iter().collect();
        let scales = scales(&visible);
        let region = around(Point::new(-500.0, -500.0), 20.0);

        let subset = select(Some(&region), &visible, &scales);
        assert!(subset.is_empty());
        assert_eq!(summarize_selection(Some(&region), &subset, &scales).count, 0);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1.0 / 3.0), "33.3%");
        assert_eq!(format_percent(2.0 / 3.0), "66.7%");
        assert_eq!(format_percent(0.5), "50%");
        assert_eq!(format_percent(1.0), "100%");
        assert_eq!(selection_label(1), "1 commit selected");
    }
}
