//! Time-window controller.
//!
//! Owns the one `FilterState` of a session. Both input sources (the range
//! control and narrative checkpoints) end in `set_cursor`, which recomputes
//! the visible set and then, in order: scales, plot, summary panels, and
//! finally drops any brush selection (its pixels referred to the old marks).
//!
//! Visibility is inclusive: a commit authored exactly at the cursor is shown.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{CursorView, DatasetInfo, Point, RangeControlState, SelectionSummary, TimelineView};
use crate::timeline::aggregate::{aggregate, Commit};
use crate::timeline::config::ViewConfig;
use crate::timeline::narrative::NarrativeTrack;
use crate::timeline::panels::{CategoryPalette, SummaryPanels};
use crate::timeline::plot::{PlotScene, RenderDiff};
use crate::timeline::record::LineRecord;
use crate::timeline::scales::{time_extent, Scales, TimeScale};
use crate::timeline::selection::{select, summarize_selection, BrushPhase, SelectionRegion};

/// A bounded input control: `min <= value <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeControl {
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

impl RangeControl {
    fn clamp(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.min.min(self.max), self.max.max(self.min))
        } else {
            self.max
        }
    }

    pub fn fill_percent(&self) -> f64 {
        if self.max == self.min {
            return 100.0;
        }
        (self.value - self.min) / (self.max - self.min) * 100.0
    }

    pub fn to_state(&self) -> RangeControlState {
        RangeControlState {
            min: self.min,
            max: self.max,
            value: self.value,
            fill_percent: self.fill_percent(),
        }
    }
}

/// Range control plus the time scale fitted to the full commit extent.
#[derive(Debug, Clone)]
struct Slider {
    control: RangeControl,
    scale: TimeScale,
}

/// The single piece of mutable state shared by every panel.
#[derive(Debug, Clone)]
struct FilterState {
    cursor_time: DateTime<Utc>,
    /// Indices into the commit list, in commit order.
    visible: Vec<usize>,
    selection_region: Option<SelectionRegion>,
}

fn pick<'a>(commits: &'a [Commit], indices: &[usize]) -> Vec<&'a Commit> {
    indices.iter().map(|&i| &commits[i]).collect()
}

pub fn format_cursor(cursor: &DateTime<Utc>) -> String {
    cursor.format("%B %-d, %Y at %-I:%M %p").to_string()
}

pub struct TimelineController {
    source: String,
    record_count: usize,
    commits: Vec<Commit>,
    config: ViewConfig,
    palette: CategoryPalette,
    slider: Option<Slider>,
    narrative: NarrativeTrack,
    filter: FilterState,
    scales: Scales,
    plot: PlotScene,
    panels: SummaryPanels,
    selection: SelectionSummary,
}

impl TimelineController {
    /// Aggregates `records` and renders the initial window: the range
    /// control's configured starting value if any, else the full history.
    pub fn new(source: impl Into<String>, records: Vec<LineRecord>, config: ViewConfig) -> Self {
        let record_count = records.len();
        let commits = aggregate(records);
        let palette = CategoryPalette::from_commits(&commits);
        let narrative = NarrativeTrack::build(&commits, &config.narrative);

        let extent = time_extent(&commits);
        let latest = extent.map(|(_, hi)| hi).unwrap_or_default();
        let (first, last) = extent.unwrap_or((latest, latest));

        let mut slider = config.range.map(|range| Slider {
            control: RangeControl {
                min: range.min,
                max: range.max,
                value: range.max,
            },
            scale: TimeScale::new(first, last, (range.min, range.max)),
        });
        let initial = config.range.and_then(|range| range.initial);
        let cursor = match (slider.as_mut(), initial) {
            (Some(slider), Some(value)) => {
                slider.control.value = slider.control.clamp(value);
                slider.scale.invert(slider.control.value)
            }
            _ => latest,
        };

        tracing::info!(
            "Aggregated {} records into {} commits",
            record_count,
            commits.len()
        );

        let scales = Scales::fit(&[], cursor, &config);
        let mut controller = Self {
            source: source.into(),
            record_count,
            commits,
            config,
            palette,
            slider,
            narrative,
            filter: FilterState {
                cursor_time: cursor,
                visible: Vec::new(),
                selection_region: None,
            },
            scales,
            plot: PlotScene::new(),
            panels: SummaryPanels::default(),
            selection: SelectionSummary::empty(),
        };
        controller.set_cursor(cursor);
        controller
    }

    /// The single reducer every cursor change goes through.
    pub fn set_cursor(&mut self, cursor: DateTime<Utc>) -> RenderDiff {
        self.filter.cursor_time = cursor;
        self.filter.visible = self
            .commits
            .iter()
            .enumerate()
            .filter(|(_, commit)| commit.authored_utc() <= cursor)
            .map(|(i, _)| i)
            .collect();

        let visible = pick(&self.commits, &self.filter.visible);
        self.scales = Scales::fit(&visible, cursor, &self.config);
        let diff = self.plot.render(&visible, &self.scales);
        self.panels = SummaryPanels::compute(&visible, &self.palette);

        self.filter.selection_region = None;
        self.plot.set_selected(&HashSet::new());
        self.selection = SelectionSummary::empty();

        tracing::debug!(
            cursor = %cursor,
            visible = visible.len(),
            entered = diff.entered.len(),
            updated = diff.updated.len(),
            exited = diff.exited.len(),
            "Recomputed time window"
        );
        diff
    }

    /// Range control moved to `value` (clamped to the control's bounds).
    pub fn range_input(&mut self, value: f64) -> Result<RenderDiff> {
        if !value.is_finite() {
            return Err(AppError::InvalidInput(format!("range value {}", value)));
        }
        let slider = self
            .slider
            .as_mut()
            .ok_or_else(|| AppError::InvalidInput("no range control configured".to_string()))?;
        slider.control.value = slider.control.clamp(value);
        let cursor = slider.scale.invert(slider.control.value);
        Ok(self.set_cursor(cursor))
    }

    /// Narrative checkpoint for `commit_id` reached. Moves the range control
    /// to the matching position so both inputs agree.
    pub fn narrative_step(&mut self, commit_id: &str) -> Result<RenderDiff> {
        let cursor = self
            .commit(commit_id)
            .map(|c| c.authored_utc())
            .ok_or_else(|| AppError::CommitNotFound(commit_id.to_string()))?;

        if let Some(slider) = self.slider.as_mut() {
            slider.control.value = slider.control.clamp(slider.scale.map(&cursor));
        }
        self.narrative.sync_to(commit_id);
        Ok(self.set_cursor(cursor))
    }

    /// Scroll position changed. Steps the narrative only when a different
    /// checkpoint became active.
    pub fn scroll(&mut self, scroll_top: f64, viewport_height: f64) -> Result<Option<RenderDiff>> {
        if !scroll_top.is_finite() || !viewport_height.is_finite() {
            return Err(AppError::InvalidInput("scroll position must be finite".to_string()));
        }
        let fired = self
            .narrative
            .observe(scroll_top, viewport_height)
            .map(|checkpoint| checkpoint.commit_id.clone());
        match fired {
            Some(id) => self.narrative_step(&id).map(Some),
            None => Ok(None),
        }
    }

    /// Brush start/move/end. `None` clears the selection.
    pub fn brush(
        &mut self,
        phase: BrushPhase,
        region: Option<SelectionRegion>,
    ) -> Result<&SelectionSummary> {
        if region.is_some_and(|r| !r.is_finite()) {
            return Err(AppError::InvalidInput("selection region must be finite".to_string()));
        }
        self.filter.selection_region = region;
        self.apply_selection();
        tracing::trace!(?phase, selected = self.selection.count, "Brush");
        Ok(&self.selection)
    }

    pub fn clear_selection(&mut self) {
        self.filter.selection_region = None;
        self.apply_selection();
    }

    /// Recomputes the selection subset and the panels that follow it: the
    /// selection when a region is active, otherwise the whole visible set.
    fn apply_selection(&mut self) {
        let region = self.filter.selection_region.as_ref();
        let visible = pick(&self.commits, &self.filter.visible);
        let subset = select(region, &visible, &self.scales);

        let ids: HashSet<&str> = subset.iter().map(|c| c.id.as_str()).collect();
        self.plot.set_selected(&ids);
        self.selection = summarize_selection(region, &subset, &self.scales);

        let authoritative = if region.is_some() { &subset } else { &visible };
        self.panels = SummaryPanels::compute(authoritative, &self.palette);
    }

    pub fn hover(&mut self, commit_id: &str, pointer: Point) -> Result<()> {
        let commit = self
            .filter
            .visible
            .iter()
            .map(|&i| &self.commits[i])
            .find(|c| c.id == commit_id)
            .ok_or_else(|| AppError::CommitNotFound(commit_id.to_string()))?;
        let url = commit.url(&self.config.repo_url);

        if self.plot.hover_enter(commit, url, pointer) {
            Ok(())
        } else {
            Err(AppError::CommitNotFound(commit_id.to_string()))
        }
    }

    pub fn unhover(&mut self) {
        self.plot.hover_leave();
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn commit(&self, commit_id: &str) -> Option<&Commit> {
        self.commits.iter().find(|c| c.id == commit_id)
    }

    pub fn cursor_time(&self) -> DateTime<Utc> {
        self.filter.cursor_time
    }

    pub fn visible_commits(&self) -> Vec<&Commit> {
        pick(&self.commits, &self.filter.visible)
    }

    pub fn is_visible(&self, commit_id: &str) -> bool {
        self.filter
            .visible
            .iter()
            .any(|&i| self.commits[i].id == commit_id)
    }

    pub fn range(&self) -> Option<RangeControl> {
        self.slider.as_ref().map(|s| s.control)
    }

    pub fn scales(&self) -> &Scales {
        &self.scales
    }

    pub fn plot(&self) -> &PlotScene {
        &self.plot
    }

    pub fn panels(&self) -> &SummaryPanels {
        &self.panels
    }

    pub fn selection(&self) -> &SelectionSummary {
        &self.selection
    }

    pub fn narrative(&self) -> &NarrativeTrack {
        &self.narrative
    }

    pub fn dataset_info(&self) -> DatasetInfo {
        let extent = time_extent(&self.commits);
        DatasetInfo {
            source: self.source.clone(),
            loaded: true,
            error: None,
            record_count: self.record_count,
            commit_count: self.commits.len(),
            first_commit_at: extent.map(|(lo, _)| lo.to_rfc3339()),
            last_commit_at: extent.map(|(_, hi)| hi.to_rfc3339()),
            categories: self.palette.categories().to_vec(),
        }
    }

    /// Snapshot of every panel from the current state.
    pub fn view(&self) -> TimelineView {
        let cursor = self.cursor_time();
        let scales = self.scales();
        let plot = self.plot();
        let panels = self.panels();

        TimelineView {
            source: self.source.clone(),
            error: None,
            cursor: Some(CursorView {
                time: cursor.to_rfc3339(),
                label: format_cursor(&cursor),
            }),
            range: self.range().map(|r| r.to_state()),
            total_commits: self.commits.len(),
            visible_commits: self.filter.visible.len(),
            x_axis: scales.x.axis(),
            y_axis: scales.y.axis(),
            marks: plot.marks().map(|m| m.to_view()).collect(),
            tooltip: plot.tooltip().to_view(),
            stat_items: panels.stats.items(),
            stats: panels.stats.clone(),
            files: panels.files.clone(),
            categories: panels.categories.clone(),
            selection: self.selection().clone(),
            narrative_active: self.narrative().active().map(|c| c.commit_id.clone()),
        }
    }
}
