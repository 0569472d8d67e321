//! Dataset info and reloading.
//!
//! - GET /api/v1/dataset
//!   What is loaded: path, record and commit counts, time extent,
//!   categories. When the load failed, `loaded: false` and the reason.
//!
//! - POST /api/v1/dataset/load { path: string }
//!   Loads another CSV and replaces the whole session. The previous
//!   session stays in place if the new one fails to load.

use std::path::PathBuf;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::models::{DatasetInfo, LoadDatasetRequest};
use crate::timeline::{SharedTimeline, TimelineSession};

pub fn routes(timeline: SharedTimeline) -> Router {
    Router::new()
        .route("/api/v1/dataset", get(get_dataset_info))
        .route("/api/v1/dataset/load", post(load_dataset))
        .with_state(timeline)
}

async fn get_dataset_info(State(timeline): State<SharedTimeline>) -> Result<Json<DatasetInfo>> {
    let timeline = timeline.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    Ok(Json(timeline.dataset_info()))
}

async fn load_dataset(
    State(timeline): State<SharedTimeline>,
    Json(request): Json<LoadDatasetRequest>,
) -> Result<Json<DatasetInfo>> {
    let config = {
        let guard = timeline.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        guard.config().clone()
    };

    let session = TimelineSession::try_open(PathBuf::from(&request.path), config).await?;
    let info = session.dataset_info();
    tracing::info!("Switched dataset to {}", request.path);

    let mut guard = timeline.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    *guard = session;
    Ok(Json(info))
}
