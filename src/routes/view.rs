//! Current snapshot and cursor inputs.
//!
//! - GET /api/v1/view
//!   The `TimelineView` snapshot. Served even when no dataset is loaded
//!   (empty placeholder carrying the error).
//!
//! - POST /api/v1/cursor/range { value: number }
//!   Range control moved. Clamped to the control bounds.
//!
//! - POST /api/v1/cursor/step { commit: string }
//!   Jump the cursor to a commit, as a narrative checkpoint does.
//!
//! Both inputs return the recomputed snapshot.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::TimelineView;
use crate::timeline::SharedTimeline;

pub fn routes(timeline: SharedTimeline) -> Router {
    Router::new()
        .route("/api/v1/view", get(get_view))
        .route("/api/v1/cursor/range", post(range_input))
        .route("/api/v1/cursor/step", post(narrative_step))
        .with_state(timeline)
}

#[derive(Debug, Deserialize)]
struct RangeInputRequest {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    commit: String,
}

async fn get_view(State(timeline): State<SharedTimeline>) -> Result<Json<TimelineView>> {
    let timeline = timeline.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    Ok(Json(timeline.view()))
}

async fn range_input(
    State(timeline): State<SharedTimeline>,
    Json(request): Json<RangeInputRequest>,
) -> Result<Json<TimelineView>> {
    let mut timeline = timeline.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let controller = timeline.controller_mut()?;
    controller.range_input(request.value)?;
    Ok(Json(controller.view()))
}

async fn narrative_step(
    State(timeline): State<SharedTimeline>,
    Json(request): Json<StepRequest>,
) -> Result<Json<TimelineView>> {
    let mut timeline = timeline.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let controller = timeline.controller_mut()?;
    controller.narrative_step(&request.commit)?;
    Ok(Json(controller.view()))
}
