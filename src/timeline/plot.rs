//! Retained scatter plot scene.
//!
//! Marks are keyed by commit id, so a re-render only touches marks whose
//! commit entered, left or moved. Hover state and the `selected` flag of
//! surviving marks carry over between renders.

use std::collections::{HashMap, HashSet};

use crate::models::{MarkView, Point, TooltipView};
use crate::timeline::aggregate::Commit;
use crate::timeline::scales::{Rgb, Scales};

pub const BASE_OPACITY: f64 = 0.7;
pub const HOVER_OPACITY: f64 = 1.0;

/// Tooltip offset from the pointer, in pixels.
const TOOLTIP_OFFSET: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub commit_id: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: Rgb,
    pub opacity: f64,
    pub selected: bool,
}

impl Mark {
    fn geometry(&self) -> (f64, f64, f64, Rgb) {
        (self.cx, self.cy, self.r, self.fill)
    }

    pub fn to_view(&self) -> MarkView {
        MarkView {
            commit_id: self.commit_id.clone(),
            cx: self.cx,
            cy: self.cy,
            r: self.r,
            fill: self.fill.to_hex(),
            opacity: self.opacity,
            selected: self.selected,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub commit_id: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
    pub position: Point,
}

impl Tooltip {
    pub fn to_view(&self) -> TooltipView {
        TooltipView {
            visible: self.visible,
            commit_id: self.commit_id.clone(),
            url: self.url.clone(),
            date: self.date.clone(),
            left: self.position.x,
            top: self.position.y,
        }
    }
}

/// Commit ids touched by one render, in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderDiff {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PlotScene {
    marks: HashMap<String, Mark>,
    /// Draw order: largest first so small marks stay on top.
    order: Vec<String>,
    hovered: Option<String>,
    tooltip: Tooltip,
}

impl PlotScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the scene with `visible`.
    pub fn render(&mut self, visible: &[&Commit], scales: &Scales) -> RenderDiff {
        let mut sorted: Vec<&Commit> = visible.to_vec();
        sorted.sort_by(|a, b| b.total_lines.cmp(&a.total_lines));

        let mut diff = RenderDiff::default();
        let mut next_order = Vec::with_capacity(sorted.len());
        let keep: HashSet<&str> = sorted.iter().map(|c| c.id.as_str()).collect();

        for id in &self.order {
            if !keep.contains(id.as_str()) {
                self.marks.remove(id);
                diff.exited.push(id.clone());
            }
        }

        for commit in sorted {
            let position = scales.position(commit);
            let r = scales.r.map(commit.total_lines);
            let fill = scales.color.map(commit.hour_of_day);

            match self.marks.get_mut(&commit.id) {
                Some(mark) => {
                    let before = mark.geometry();
                    mark.cx = position.x;
                    mark.cy = position.y;
                    mark.r = r;
                    mark.fill = fill;
                    if mark.geometry() != before {
                        diff.updated.push(commit.id.clone());
                    }
                }
                None => {
                    self.marks.insert(
                        commit.id.clone(),
                        Mark {
                            commit_id: commit.id.clone(),
                            cx: position.x,
                            cy: position.y,
                            r,
                            fill,
                            opacity: BASE_OPACITY,
                            selected: false,
                        },
                    );
                    diff.entered.push(commit.id.clone());
                }
            }
            next_order.push(commit.id.clone());
        }
        self.order = next_order;

        let hovered_exited = self
            .hovered
            .as_ref()
            .is_some_and(|id| !self.marks.contains_key(id));
        if hovered_exited {
            self.hovered = None;
            self.tooltip = Tooltip::default();
        }

        diff
    }

    /// Raises the mark for `commit` and fills the tooltip. Returns `false`
    /// when the commit has no mark on screen.
    pub fn hover_enter(&mut self, commit: &Commit, url: String, pointer: Point) -> bool {
        if !self.marks.contains_key(&commit.id) {
            return false;
        }
        self.hover_leave();

        if let Some(mark) = self.marks.get_mut(&commit.id) {
            mark.opacity = HOVER_OPACITY;
        }
        self.hovered = Some(commit.id.clone());
        self.tooltip = Tooltip {
            visible: true,
            commit_id: Some(commit.id.clone()),
            url: Some(url),
            date: Some(commit.authored_at.format("%A, %B %-d, %Y").to_string()),
            position: Point::new(pointer.x + TOOLTIP_OFFSET, pointer.y + TOOLTIP_OFFSET),
        };
        true
    }

    pub fn hover_leave(&mut self) {
        if let Some(id) = self.hovered.take() {
            if let Some(mark) = self.marks.get_mut(&id) {
                mark.opacity = BASE_OPACITY;
            }
        }
        self.tooltip.visible = false;
    }

    pub fn set_selected(&mut self, selected: &HashSet<&str>) {
        for (id, mark) in self.marks.iter_mut() {
            mark.selected = selected.contains(id.as_str());
        }
    }

    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.order.iter().filter_map(|id| self.marks.get(id))
    }

    pub fn mark(&self, commit_id: &str) -> Option<&Mark> {
        self.marks.get(commit_id)
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::aggregate::aggregate;
    use crate::timeline::config::ViewConfig;
    use crate::timeline::record::fixtures::line;
    use chrono::Utc;

    fn commits() -> Vec<Commit> {
        aggregate(vec![
            line("small", "a.rs", "rs", "2024-05-01T10:00:00+00:00"),
            line("big", "a.rs", "rs", "2024-05-02T11:00:00+00:00"),
            line("big", "b.rs", "rs", "2024-05-02T11:00:00+00:00"),
            line("big", "c.rs", "rs", "2024-05-02T11:00:00+00:00"),
            line("mid", "a.rs", "rs", "2024-05-03T12:00:00+00:00"),
            line("mid", "b.rs", "rs", "2024-05-03T12:00:00+00:00"),
        ])
    }

    fn render(scene: &mut PlotScene, visible: &[&Commit]) -> RenderDiff {
        let cursor = visible
            .iter()
            .map(|c| c.authored_utc())
            .max()
            .unwrap_or_else(Utc::now);
        let scales = Scales::fit(visible, cursor, &ViewConfig::default());
        scene.render(visible, &scales)
    }

    #[test]
    fn test_draw_order_largest_first() {
        let commits = commits();
        let visible: Vec<&Commit> = commits.iter().collect();
        let mut scene = PlotScene::new();
        let diff = render(&mut scene, &visible);

        assert_eq!(diff.entered, vec!["big", "mid", "small"]);
        let order: Vec<&str> = scene.marks().map(|m| m.commit_id.as_str()).collect();
        assert_eq!(order, vec!["big", "mid", "small"]);
        assert!(scene.marks().all(|m| m.opacity == BASE_OPACITY));
    }

    #[test]
    fn test_rerender_is_keyed_by_commit_id() {
        let commits = commits();
        let all: Vec<&Commit> = commits.iter().collect();
        let mut scene = PlotScene::new();
        render(&mut scene, &all[..2]);

        let diff = render(&mut scene, &all);
        assert_eq!(diff.entered, vec!["mid"]);
        assert!(diff.exited.is_empty());

        let diff = render(&mut scene, &all[..1]);
        assert!(diff.entered.is_empty());
        assert_eq!(diff.exited.len(), 2);
        assert!(scene.mark("small").is_some());
        assert!(scene.mark("big").is_none());
    }

    #[test]
    fn test_identical_render_touches_nothing() {
        let commits = commits();
        let all: Vec<&Commit> = commits.iter().collect();
        let mut scene = PlotScene::new();
        render(&mut scene, &all);
        assert_eq!(render(&mut scene, &all), RenderDiff::default());
    }

    #[test]
    fn test_hover_survives_rerender_and_clears_on_exit() {
        let commits = commits();
        let all: Vec<&Commit> = commits.iter().collect();
        let mut scene = PlotScene::new();
        render(&mut scene, &all);

        assert!(scene.hover_enter(&commits[0], "https://x/commit/small".into(), Point::new(5.0, 7.0)));
        assert_eq!(scene.mark("small").unwrap().opacity, HOVER_OPACITY);
        let tooltip = scene.tooltip();
        assert!(tooltip.visible);
        assert_eq!(tooltip.position, Point::new(15.0, 17.0));
        assert_eq!(tooltip.date.as_deref(), Some("Wednesday, May 1, 2024"));

        render(&mut scene, &all[..2]);
        assert_eq!(scene.mark("small").unwrap().opacity, HOVER_OPACITY);
        assert!(scene.tooltip().visible);

        render(&mut scene, &all[1..2]);
        assert!(scene.tooltip().commit_id.is_none());
        assert!(!scene.tooltip().visible);
    }

    #[test]
    fn test_hover_leave_restores_opacity() {
        let commits = commits();
        let all: Vec<&Commit> = commits.iter().collect();
        let mut scene = PlotScene::new();
        render(&mut scene, &all);

        scene.hover_enter(&commits[1], String::new(), Point::default());
        scene.hover_enter(&commits[2], String::new(), Point::default());
        assert_eq!(scene.mark("big").unwrap().opacity, BASE_OPACITY);
        assert_eq!(scene.mark("mid").unwrap().opacity, HOVER_OPACITY);

        scene.hover_leave();
        assert!(scene.marks().all(|m| m.opacity == BASE_OPACITY));
        assert!(!scene.tooltip().visible);
    }

    #[test]
    fn test_hover_on_missing_mark_is_rejected() {
        let commits = commits();
        let mut scene = PlotScene::new();
        render(&mut scene, &[&commits[0]]);
        assert!(!scene.hover_enter(&commits[1], String::new(), Point::default()));
        assert!(!scene.tooltip().visible);
    }
}
