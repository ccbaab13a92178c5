use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::query::{EpochList, LocationReport, SpeedReport, StateVectorReport};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

/// Raw pagination parameters. Kept as strings so that malformed or negative
/// values are reported as `invalid_parameter` instead of an extractor rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EpochsQuery {
    /// Maximum number of epochs to return
    pub limit: Option<String>,
    /// Number of epochs to skip (0-based)
    pub offset: Option<String>,
}

#[utoipa::path(
    get,
    path = "/epochs",
    tag = "epochs",
    params(EpochsQuery),
    responses(
        (status = 200, description = "Epochs in ascending order", body = EpochList),
        (status = 400, description = "Malformed limit or offset", body = ErrorResponse)
    )
)]
pub async fn list_epochs(
    State(state): State<AppState>,
    Query(query): Query<EpochsQuery>,
) -> ApiResult<Json<EpochList>> {
    let limit = parse_integer("limit", query.limit.as_deref())?;
    let offset = parse_integer("offset", query.offset.as_deref())?;
    Ok(Json(state.engine.list_epochs(limit, offset)?))
}

#[utoipa::path(
    get,
    path = "/epochs/{epoch}",
    tag = "epochs",
    params(("epoch" = String, Path, description = "Epoch, e.g. 2024-10-26T00:04:00Z or 2024-300T00:04:00.000Z")),
    responses(
        (status = 200, description = "State vector", body = StateVectorReport),
        (status = 404, description = "No sample at this epoch", body = ErrorResponse)
    )
)]
pub async fn get_state_vector(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> ApiResult<Json<StateVectorReport>> {
    Ok(Json(state.engine.state_vector(&epoch)?))
}

#[utoipa::path(
    get,
    path = "/epochs/{epoch}/speed",
    tag = "epochs",
    params(("epoch" = String, Path, description = "Epoch")),
    responses(
        (status = 200, description = "Instantaneous speed", body = SpeedReport),
        (status = 404, description = "No sample at this epoch", body = ErrorResponse)
    )
)]
pub async fn get_speed(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> ApiResult<Json<SpeedReport>> {
    Ok(Json(state.engine.speed(&epoch)?))
}

#[utoipa::path(
    get,
    path = "/epochs/{epoch}/location",
    tag = "epochs",
    params(("epoch" = String, Path, description = "Epoch")),
    responses(
        (status = 200, description = "Geodetic position and place name", body = LocationReport),
        (status = 404, description = "No sample at this epoch", body = ErrorResponse)
    )
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> ApiResult<Json<LocationReport>> {
    Ok(Json(state.engine.location(&epoch).await?))
}

fn parse_integer(name: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    raw.map(|value| {
        value.trim().parse::<i64>().map_err(|_| {
            ApiError::InvalidParameter(format!("{name} must be an integer, got '{value}'"))
        })
    })
    .transpose()
}
