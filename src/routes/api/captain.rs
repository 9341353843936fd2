use rocket::serde::json::Json;
use rocket::{get, State};
use serde::Serialize;

use crate::app::AppState;
use crate::errors::{ApiError, ForbiddenSnafu, NotFoundSnafu};
use crate::macros::error_handler::handle_error_http;
use crate::modules::helpers::leaderboard::{LeaderboardHelper, VanLegStatus};
use crate::modules::ingestion::{Credentials, Submitter};

#[derive(Serialize)]
pub struct VanLegs {
    pub team_id: i32,
    pub van_number: i32,
    pub legs: Vec<VanLegStatus>,
    pub completed_legs: Vec<i32>,
}

/// # legs of the captains van
/// every leg of the van with the scheduled runner and completion status
#[get("/captain/legs")]
pub fn van_legs(credentials: Credentials, state: &State<AppState>) -> Result<Json<VanLegs>, ApiError> {
    let target = "routes/api/captain:van_legs";
    let (team_id, van_number) = match handle_error_http!(state.ingestion.authenticate(&credentials), target, "credentials") {
        Submitter::Captain { runner, van_number } => (runner.team_id, van_number),
        _ => {
            return Err(ForbiddenSnafu {
                reason: "captain access required",
            }
            .build()
            .into())
        }
    };

    let roster = match handle_error_http!(state.repository.find_team(team_id), target, "team") {
        Some(roster) => roster,
        None => return Err(NotFoundSnafu { what: format!("team {}", team_id) }.build().into()),
    };
    let legs = handle_error_http!(state.repository.list_legs(), target, "legs");
    let results = handle_error_http!(state.repository.list_results_grouped(), target, "results");

    let status = LeaderboardHelper::van_leg_status(&roster, van_number, &legs, &results, &state.config);

    Ok(Json(VanLegs {
        team_id,
        van_number,
        completed_legs: status
            .iter()
            .filter(|leg| leg.completed)
            .map(|leg| leg.leg_number)
            .collect(),
        legs: status,
    }))
}
