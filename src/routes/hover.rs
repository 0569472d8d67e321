//! Mark hover.
//!
//! - POST /api/v1/hover { commit: string, pointer: {x, y} }
//!   Highlights a visible commit's mark and shows its tooltip near the
//!   pointer. 404 when the commit is not currently plotted.
//!
//! - DELETE /api/v1/hover
//!   Pointer left the mark.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Point, TimelineView};
use crate::timeline::SharedTimeline;

pub fn routes(timeline: SharedTimeline) -> Router {
    Router::new()
        .route("/api/v1/hover", post(hover_enter).delete(hover_leave))
        .with_state(timeline)
}

#[derive(Debug, Deserialize)]
struct HoverRequest {
    commit: String,
    #[serde(default)]
    pointer: Point,
}

async fn hover_enter(
    State(timeline): State<SharedTimeline>,
    Json(request): Json<HoverRequest>,
) -> Result<Json<TimelineView>> {
    let mut timeline = timeline.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let controller = timeline.controller_mut()?;
    controller.hover(&request.commit, request.pointer)?;
    Ok(Json(controller.view()))
}

async fn hover_leave(State(timeline): State<SharedTimeline>) -> Result<Json<TimelineView>> {
    let mut timeline = timeline.write().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let controller = timeline.controller_mut()?;
    controller.unhover();
    Ok(Json(controller.view()))
}
