//! Commit timeline engine.
//!
//! - `loader`/`record`: CSV rows → `LineRecord`
//! - `aggregate`: line records → `Commit`
//! - `scales`, `plot`: commits → positioned marks
//! - `selection`, `panels`: brush subset and summary panels
//! - `narrative`: scroll checkpoints
//! - `controller`: the filter state tying all of the above together
//!
//! `TimelineSession` is what the server shares: a controller when the dataset
//! loaded, or the reason it did not.

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod loader;
pub mod narrative;
pub mod panels;
pub mod plot;
pub mod record;
pub mod scales;
pub mod selection;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::{AppError, Result};
use crate::models::{DatasetInfo, TimelineView};

pub use config::ViewConfig;
pub use controller::TimelineController;

pub enum TimelineState {
    Loaded(Box<TimelineController>),
    Unavailable { reason: String },
}

pub struct TimelineSession {
    source: String,
    config: ViewConfig,
    state: TimelineState,
}

pub type SharedTimeline = Arc<RwLock<TimelineSession>>;

impl TimelineSession {
    pub fn from_controller(controller: TimelineController) -> Self {
        Self {
            source: controller.source().to_string(),
            config: controller.config().clone(),
            state: TimelineState::Loaded(Box::new(controller)),
        }
    }

    pub fn unavailable(source: impl Into<String>, config: ViewConfig, reason: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            config,
            state: TimelineState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    /// Loads and aggregates the CSV at `path` on the blocking pool.
    pub async fn try_open(path: PathBuf, config: ViewConfig) -> Result<Self> {
        let source = path.to_string_lossy().to_string();
        let controller = tokio::task::spawn_blocking(move || {
            let records = loader::load_file(&path)?;
            Ok::<_, AppError>(TimelineController::new(source, records, config))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(Self::from_controller(controller))
    }

    /// Like `try_open`, but a failed load yields an unavailable session so the
    /// server can still start and render a placeholder.
    pub async fn open(path: PathBuf, config: ViewConfig) -> Self {
        let source = path.to_string_lossy().to_string();
        match Self::try_open(path, config.clone()).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Dataset {} unavailable: {}", source, e);
                Self::unavailable(source, config, e.to_string())
            }
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn controller(&self) -> Result<&TimelineController> {
        match &self.state {
            TimelineState::Loaded(controller) => Ok(&**controller),
            TimelineState::Unavailable { reason } => Err(AppError::DatasetUnavailable(reason.clone())),
        }
    }

    pub fn controller_mut(&mut self) -> Result<&mut TimelineController> {
        match &mut self.state {
            TimelineState::Loaded(controller) => Ok(&mut **controller),
            TimelineState::Unavailable { reason } => Err(AppError::DatasetUnavailable(reason.clone())),
        }
    }

    pub fn view(&self) -> TimelineView {
        match &self.state {
            TimelineState::Loaded(controller) => controller.view(),
            TimelineState::Unavailable { reason } => TimelineView::placeholder(&self.source, reason),
        }
    }

    pub fn dataset_info(&self) -> DatasetInfo {
        match &self.state {
            TimelineState::Loaded(controller) => controller.dataset_info(),
            TimelineState::Unavailable { reason } => DatasetInfo {
                source: self.source.clone(),
                loaded: false,
                error: Some(reason.clone()),
                record_count: 0,
                commit_count: 0,
                first_commit_at: None,
                last_commit_at: None,
                categories: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "commit,file,line,type,depth,length,author,date,time,timezone,datetime\n\
        c1,src/a.rs,1,rs,0,12,ada,2024-05-01,09:00,+00:00,2024-05-01T09:00:00+00:00\n\
        c1,src/a.rs,2,rs,1,20,ada,2024-05-01,09:00,+00:00,2024-05-01T09:00:00+00:00\n\
        c2,index.html,1,html,0,30,bo,2024-05-02,21:30,+02:00,2024-05-02T21:30:00+02:00\n";

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_open_loads_dataset() {
        let file = write_csv(CSV);
        let session = TimelineSession::open(file.path().to_path_buf(), ViewConfig::default()).await;

        let controller = session.controller().unwrap();
        assert_eq!(controller.commits().len(), 2);
        let info = session.dataset_info();
        assert!(info.loaded);
        assert_eq!(info.record_count, 3);
        assert_eq!(session.view().visible_commits, 2);
    }

    #[tokio::test]
    async fn test_missing_file_yields_placeholder() {
        let mut session =
            TimelineSession::open(PathBuf::from("/nonexistent/loc.csv"), ViewConfig::default()).await;

        assert!(matches!(session.state(), TimelineState::Unavailable { .. }));
        assert!(matches!(
            session.controller_mut(),
            Err(AppError::DatasetUnavailable(_))
        ));
        let view = session.view();
        assert!(view.error.is_some());
        assert!(view.marks.is_empty());
        assert!(!session.dataset_info().loaded);
    }

    #[tokio::test]
    async fn test_try_open_reports_parse_errors() {
        let file = write_csv("commit,file\nc1,a.rs\n");
        let result = TimelineSession::try_open(file.path().to_path_buf(), ViewConfig::default()).await;
        assert!(matches!(result, Err(AppError::Parse(_))));
    }
}
