//! Server-rendered page and plot.
//!
//! - GET /          HTML page with every panel
//! - GET /plot.svg  the scatter plot alone

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::render::{render_page, render_plot};
use crate::timeline::SharedTimeline;

pub fn routes(timeline: SharedTimeline) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/plot.svg", get(plot))
        .with_state(timeline)
}

async fn index(State(timeline): State<SharedTimeline>) -> Result<Html<String>> {
    let timeline = timeline.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let narrative = timeline
        .controller()
        .map(|c| c.narrative().views())
        .unwrap_or_default();
    Ok(Html(render_page(&timeline.view(), &narrative, timeline.config())))
}

async fn plot(State(timeline): State<SharedTimeline>) -> Result<impl IntoResponse> {
    let timeline = timeline.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let svg = render_plot(&timeline.view(), timeline.config());
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
