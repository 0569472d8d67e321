//! Brush selection over the plot.
//!
//! - POST /api/v1/selection { phase: "start"|"move"|"end", region }
//!   `region` is `[[x0, y0], [x1, y1]]` or `{x0, y0, x1, y1}` in plot
//!   pixels; `null` clears. Every phase recomputes the selection, so the
//!   count and breakdown follow the drag live.
//!
//! - DELETE /api/v1/selection
//!   Clears the selection.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::TimelineView;
use crate::timeline::selection::{BrushPhase, SelectionRegion};
use crate::timeline::SharedTimeline;

pub fn routes(timeline: SharedTimeline) -> Router {
    Router::new()
        .route("/api/v1/selection", post(brush).delete(clear_selection))
        .with_state(timeline)
}

#[derive(Debug, Deserialize)]
struct BrushRequest {
    phase: BrushPhase,
    region: Option<SelectionRegion>,
}

async fn brush(
    State(timeline): State<SharedTimeline>,
    Json(request): Json<BrushRequest>,
) -> Result<Json<TimelineView>> {
    let mut timeline = timeline.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let controller = timeline.controller_mut()?;
    controller.brush(request.phase, request.region)?;
    Ok(Json(controller.view()))
}

async fn clear_selection(State(timeline): State<SharedTimeline>) -> Result<Json<TimelineView>> {
    let mut timeline = timeline.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let controller = timeline.controller_mut()?;
    controller.clear_selection();
    Ok(Json(controller.view()))
}
