use rocket::serde::json::Json;
use rocket::{post, State};

use crate::app::AppState;
use crate::errors::{ApiError, ForbiddenSnafu};
use crate::macros::error_handler::handle_error_http;
use crate::modules::ingestion::{Credentials, Submitter, TimeSubmission};
use crate::modules::models::leg_result::LegResult;

/// # runner enters their own time
/// captains use this for their own legs too, the result is then marked as
/// entered by the runner
#[post("/entry/time", format = "json", data = "<submission>")]
pub fn submit_time(
    credentials: Credentials,
    submission: Json<TimeSubmission>,
    state: &State<AppState>,
) -> Result<Json<LegResult>, ApiError> {
    let target = "routes/api/entry:submit_time";
    let submitter = match handle_error_http!(state.ingestion.authenticate(&credentials), target, "credentials") {
        Submitter::Runner(runner) | Submitter::Captain { runner, .. } => Submitter::Runner(runner),
        Submitter::Admin => {
            return Err(ForbiddenSnafu {
                reason: "admins enter times through /api/entry/van",
            }
            .build()
            .into())
        }
    };

    let result = handle_error_http!(
        state.ingestion.submit(&submitter, &submission),
        target,
        format!("time for leg {}", submission.leg_number)
    );

    Ok(Json(result))
}

/// # captain or admin enters a time for a runner
#[post("/entry/van", format = "json", data = "<submission>")]
pub fn submit_van(
    credentials: Credentials,
    submission: Json<TimeSubmission>,
    state: &State<AppState>,
) -> Result<Json<LegResult>, ApiError> {
    let target = "routes/api/entry:submit_van";
    let submitter = handle_error_http!(state.ingestion.authenticate(&credentials), target, "credentials");
    if let Submitter::Runner(_) = submitter {
        return Err(ForbiddenSnafu {
            reason: "captain or admin access required",
        }
        .build()
        .into());
    }

    let result = handle_error_http!(
        state.ingestion.submit(&submitter, &submission),
        target,
        format!("van time for leg {}", submission.leg_number)
    );

    Ok(Json(result))
}
