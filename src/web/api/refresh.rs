use axum::{extract::State, Json};

use crate::refresh::{RefreshOutcome, RefreshStatus};
use crate::web::state::AppState;

#[utoipa::path(
    post,
    path = "/refresh",
    tag = "refresh",
    responses(
        (status = 200, description = "Result of the refresh cycle", body = RefreshOutcome)
    )
)]
pub async fn trigger(State(state): State<AppState>) -> Json<RefreshOutcome> {
    Json(state.refresher.refresh().await)
}

#[utoipa::path(
    get,
    path = "/refresh/status",
    tag = "refresh",
    responses(
        (status = 200, description = "Refresh scheduler status", body = RefreshStatus)
    )
)]
pub async fn status(State(state): State<AppState>) -> Json<RefreshStatus> {
    Json(state.refresher.status())
}
