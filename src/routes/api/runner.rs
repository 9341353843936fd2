use rocket::serde::json::Json;
use rocket::{get, State};
use serde::Serialize;

use crate::app::AppState;
use crate::errors::{ApiError, ForbiddenSnafu};
use crate::macros::error_handler::handle_error_http;
use crate::modules::helpers::leaderboard::{LeaderboardHelper, RunnerLegDetail};
use crate::modules::ingestion::Credentials;
use crate::modules::models::runner::Runner;

#[derive(Serialize)]
pub struct RunnerLegs {
    pub runner: Runner,
    pub legs: Vec<RunnerLegDetail>,
    pub completed_legs: Vec<i32>,
    /// the first assigned leg without a result
    pub next_leg: Option<i32>,
}

/// # legs of the signed in runner
#[get("/runner/legs")]
pub fn my_legs(credentials: Credentials, state: &State<AppState>) -> Result<Json<RunnerLegs>, ApiError> {
    let target = "routes/api/runner:my_legs";
    let submitter = handle_error_http!(state.ingestion.authenticate(&credentials), target, "credentials");
    let runner = match submitter.runner() {
        Some(runner) => runner.clone(),
        None => {
            return Err(ForbiddenSnafu {
                reason: "only runners have legs",
            }
            .build()
            .into())
        }
    };

    let legs = handle_error_http!(state.repository.list_legs(), target, "legs");
    let results = handle_error_http!(state.repository.runner_results(runner.id), target, "runner results");
    let details = LeaderboardHelper::runner_leg_details(&runner, &legs, &results, &state.config);

    Ok(Json(RunnerLegs {
        completed_legs: details
            .iter()
            .filter(|detail| detail.is_completed())
            .map(|detail| detail.leg_number)
            .collect(),
        next_leg: details
            .iter()
            .find(|detail| !detail.is_completed())
            .map(|detail| detail.leg_number),
        legs: details,
        runner,
    }))
}
