//! Scroll-driven narrative checkpoints.
//!
//! Each commit gets a region stacked vertically in a scroll container. The
//! observer tracks which region sits under a trigger line at a fixed
//! fraction of the viewport and reports a checkpoint only when that changes.

use crate::models::NarrativeCheckpointView;
use crate::timeline::aggregate::Commit;
use crate::timeline::config::NarrativeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum NarrativeOrder {
    OldestFirst,
    NewestFirst,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub commit_id: String,
    pub top: f64,
    pub height: f64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct NarrativeTrack {
    checkpoints: Vec<Checkpoint>,
    threshold: f64,
    active: Option<usize>,
}

fn describe(commit: &Commit) -> String {
    let files = commit.file_count();
    format!(
        "On {}, {} made a commit touching {} line{} across {} file{}.",
        commit.authored_at.format("%A, %B %-d, %Y at %-I:%M %p"),
        commit.author,
        commit.total_lines,
        if commit.total_lines == 1 { "" } else { "s" },
        files,
        if files == 1 { "" } else { "s" },
    )
}

impl NarrativeTrack {
    pub fn build(commits: &[Commit], config: &NarrativeConfig) -> Self {
        let mut ordered: Vec<&Commit> = commits.iter().collect();
        ordered.sort_by_key(|c| c.authored_utc());
        if config.order == NarrativeOrder::NewestFirst {
            ordered.reverse();
        }

        let checkpoints = ordered
            .into_iter()
            .enumerate()
            .map(|(i, commit)| Checkpoint {
                commit_id: commit.id.clone(),
                top: i as f64 * config.checkpoint_height,
                height: config.checkpoint_height,
                text: describe(commit),
            })
            .collect();

        Self {
            checkpoints,
            threshold: config.threshold,
            active: None,
        }
    }

    /// Feeds a scroll position. Returns the newly active checkpoint when the
    /// trigger line crossed into a different region, `None` otherwise.
    pub fn observe(&mut self, scroll_top: f64, viewport_height: f64) -> Option<&Checkpoint> {
        let trigger = scroll_top + self.threshold * viewport_height;
        let current = self
            .checkpoints
            .partition_point(|c| c.top <= trigger)
            .checked_sub(1);

        if current == self.active {
            return None;
        }
        self.active = current;
        current.map(|i| &self.checkpoints[i])
    }

    /// Marks the checkpoint for `commit_id` active without firing, so a later
    /// scroll over the same region stays quiet.
    pub fn sync_to(&mut self, commit_id: &str) {
        if let Some(i) = self.checkpoints.iter().position(|c| c.commit_id == commit_id) {
            self.active = Some(i);
        }
    }

    pub fn active(&self) -> Option<&Checkpoint> {
        self.active.map(|i| &self.checkpoints[i])
    }

    pub fn views(&self) -> Vec<NarrativeCheckpointView> {
        self.checkpoints
            .iter()
            .enumerate()
            .map(|(i, c)| NarrativeCheckpointView {
                commit_id: c.commit_id.clone(),
                top: c.top,
                height: c.height,
                text: c.text.clone(),
                active: self.active == Some(i),
            })
            .collect()
    }
}
