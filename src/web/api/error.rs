use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::series::SeriesError;

pub enum ApiError {
    InvalidParameter(String),
    NotFound(String),
    NoData,
}

impl From<SeriesError> for ApiError {
    fn from(e: SeriesError) -> Self {
        match e {
            SeriesError::InvalidParameter(msg) => ApiError::InvalidParameter(msg),
            SeriesError::NotFound(epoch) => ApiError::NotFound(epoch),
            SeriesError::EmptySeries => ApiError::NoData,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidParameter(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("invalid_parameter", &msg)),
            )
                .into_response(),
            ApiError::NotFound(epoch) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::with_message("epoch_not_found", &epoch)),
            )
                .into_response(),
            ApiError::NoData => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::with_message(
                    "no_data",
                    "ephemeris has not been loaded yet",
                )),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
