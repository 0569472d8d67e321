//! API route handlers - maps HTTP endpoints to timeline controller inputs.
//!
//! Each submodule defines routes for a feature area:
//! - `dataset`: dataset info and reloading
//! - `commits`: commit summaries and per-commit detail
//! - `view`: the current snapshot plus range/step cursor inputs
//! - `narrative`: checkpoint list and scroll feed
//! - `selection`: brush start/move/end and clear
//! - `hover`: mark hover enter/leave
//! - `page`: server-rendered HTML page and SVG plot
//!
//! Every mutating endpoint takes the write lock for one full recompute and
//! answers with the resulting `TimelineView`.

pub mod commits;
pub mod dataset;
pub mod hover;
pub mod narrative;
pub mod page;
pub mod selection;
pub mod view;

use axum::Router;

use crate::timeline::SharedTimeline;

pub fn create_router(timeline: SharedTimeline) -> Router {
    Router::new()
        .merge(dataset::routes(timeline.clone()))
        .merge(commits::routes(timeline.clone()))
        .merge(view::routes(timeline.clone()))
        .merge(narrative::routes(timeline.clone()))
        .merge(selection::routes(timeline.clone()))
        .merge(hover::routes(timeline.clone()))
        .merge(page::routes(timeline))
}
