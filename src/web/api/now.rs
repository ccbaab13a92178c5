use axum::{extract::State, Json};

use crate::query::NowReport;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/now",
    tag = "now",
    responses(
        (status = 200, description = "Sample closest to the current time", body = NowReport),
        (status = 503, description = "No ephemeris loaded yet", body = ErrorResponse)
    )
)]
pub async fn get_now(State(state): State<AppState>) -> ApiResult<Json<NowReport>> {
    Ok(Json(state.engine.now().await?))
}
