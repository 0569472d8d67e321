//! Scroll-driven narrative.
//!
//! - GET /api/v1/narrative
//!   Checkpoints in display order with their generated text and which one
//!   is active.
//!
//! - POST /api/v1/narrative/scroll { scroll_top, viewport_height }
//!   Feeds the scroll position. Moves the cursor only when a different
//!   checkpoint crossed the trigger line; returns the snapshot either way.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{NarrativeCheckpointView, TimelineView};
use crate::timeline::SharedTimeline;

pub fn routes(timeline: SharedTimeline) -> Router {
    Router::new()
        .route("/api/v1/narrative", get(get_narrative))
        .route("/api/v1/narrative/scroll", post(scroll))
        .with_state(timeline)
}

#[derive(Debug, Deserialize)]
struct ScrollRequest {
    scroll_top: f64,
    viewport_height: f64,
}

async fn get_narrative(
    State(timeline): State<SharedTimeline>,
) -> Result<Json<Vec<NarrativeCheckpointView>>> {
    let timeline = timeline.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    Ok(Json(timeline.controller()?.narrative().views()))
}

async fn scroll(
    State(timeline): State<SharedTimeline>,
    Json(request): Json<ScrollRequest>,
) -> Result<Json<TimelineView>> {
    let mut timeline = timeline.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let controller = timeline.controller_mut()?;
    controller.scroll(request.scroll_top, request.viewport_height)?;
    Ok(Json(controller.view()))
}
