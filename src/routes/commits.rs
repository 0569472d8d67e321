//! Commit listing and detail.
//!
//! - GET /api/v1/commits?visible_only=
//!   Scalar summaries of every commit (or only the ones inside the current
//!   time window). Line records are never part of the response.
//!
//! - GET /api/v1/commits/{id}
//!   One commit plus its per-file line counts and whether it is visible.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{CommitDetail, CommitListResponse};
use crate::timeline::SharedTimeline;

pub fn routes(timeline: SharedTimeline) -> Router {
    Router::new()
        .route("/api/v1/commits", get(get_commits))
        .route("/api/v1/commits/{id}", get(get_commit))
        .with_state(timeline)
}

#[derive(Debug, Deserialize)]
struct CommitsQuery {
    #[serde(default)]
    visible_only: bool,
}

async fn get_commits(
    State(timeline): State<SharedTimeline>,
    Query(query): Query<CommitsQuery>,
) -> Result<Json<CommitListResponse>> {
    let timeline = timeline.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let controller = timeline.controller()?;
    let repo_url = &controller.config().repo_url;

    let commits = if query.visible_only {
        controller
            .visible_commits()
            .into_iter()
            .map(|c| c.summary(repo_url))
            .collect()
    } else {
        controller.commits().iter().map(|c| c.summary(repo_url)).collect()
    };

    Ok(Json(CommitListResponse {
        commits,
        total: controller.commits().len(),
        visible: controller.visible_commits().len(),
    }))
}

async fn get_commit(
    State(timeline): State<SharedTimeline>,
    Path(id): Path<String>,
) -> Result<Json<CommitDetail>> {
    let timeline = timeline.read().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let controller = timeline.controller()?;
    let commit = controller
        .commit(&id)
        .ok_or_else(|| AppError::CommitNotFound(id.clone()))?;

    Ok(Json(CommitDetail {
        summary: commit.summary(&controller.config().repo_url),
        files: commit.file_line_counts(),
        visible: controller.is_visible(&id),
    }))
}
