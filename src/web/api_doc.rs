use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use crate::derive::DerivedLocation;
use crate::query::{EpochList, LocationReport, NowReport, SpeedReport, StateVectorReport};
use crate::refresh::{RefreshOutcome, RefreshState, RefreshStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::epochs::list_epochs,
        super::api::epochs::get_state_vector,
        super::api::epochs::get_speed,
        super::api::epochs::get_location,
        super::api::now::get_now,
        super::api::refresh::trigger,
        super::api::refresh::status,
    ),
    components(
        schemas(
            EpochList,
            StateVectorReport,
            SpeedReport,
            LocationReport,
            NowReport,
            DerivedLocation,
            RefreshOutcome,
            RefreshState,
            RefreshStatus,
            ErrorResponse,
        )
    ),
    info(
        title = "ISS Tracker API",
        description = "International Space Station trajectory from the NASA OEM feed",
        version = "0.1.0"
    ),
    tags(
        (name = "epochs", description = "State vectors by epoch"),
        (name = "now", description = "Closest sample to the current time"),
        (name = "refresh", description = "Feed refresh control")
    )
)]
pub struct ApiDoc;
