//! View configuration, folded together from CLI flags.

use super::narrative::NarrativeOrder;
use super::scales::Rgb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Inner drawing area of the scatter plot, in viewBox pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

/// Bounds and optional starting position of the range control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
    pub initial: Option<f64>,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            initial: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeConfig {
    pub order: NarrativeOrder,
    pub checkpoint_height: f64,
    /// Fraction of the viewport height where checkpoints trigger.
    pub threshold: f64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            order: NarrativeOrder::OldestFirst,
            checkpoint_height: 120.0,
            threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub radius_range: (f64, f64),
    pub night_color: Rgb,
    pub day_color: Rgb,
    /// Hour anchored at the bottom of the y axis; earlier hours wrap by +24.
    pub day_start_hour: f64,
    pub repo_url: String,
    pub range: Option<RangeConfig>,
    pub narrative: NarrativeConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            margin: Margin {
                top: 10.0,
                right: 10.0,
                bottom: 30.0,
                left: 40.0,
            },
            radius_range: (2.0, 30.0),
            night_color: Rgb(0x1d, 0x35, 0x57),
            day_color: Rgb(0xf4, 0xa2, 0x59),
            day_start_hour: 0.0,
            repo_url: "https://github.com/vis-society/lab-7".to_string(),
            range: Some(RangeConfig::default()),
            narrative: NarrativeConfig::default(),
        }
    }
}

impl ViewConfig {
    pub fn plot_area(&self) -> PlotArea {
        PlotArea {
            left: self.margin.left,
            right: self.width - self.margin.right,
            top: self.margin.top,
            bottom: self.height - self.margin.bottom,
            width: self.width - self.margin.left - self.margin.right,
            height: self.height - self.margin.top - self.margin.bottom,
        }
    }
}
