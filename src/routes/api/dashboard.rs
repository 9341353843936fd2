use rocket::response::stream::{Event, EventStream};
use rocket::serde::json::Json;
use rocket::tokio::select;
use rocket::{get, Shutdown, State};
use serde::Serialize;

use crate::app::AppState;
use crate::errors::{ApiError, NotFoundSnafu};
use crate::macros::error_handler::handle_error_http;
use crate::modules::events::StandingsBroadcaster;
use crate::modules::helpers::leaderboard::{KillsEntry, LeaderboardHelper, LegBoard, RunnerLegDetail};
use crate::modules::helpers::standings::{StandingsHelper, StandingsSnapshot, TeamStanding};
use crate::modules::models::leg::Leg;
use crate::modules::models::runner::Runner;
use crate::modules::models::team::Team;
use crate::modules::repository::RunnerSearchHit;

pub const STANDINGS_EVENT: &str = "leaderboard:update";
pub const MIN_SEARCH_LENGTH: usize = 2;
pub const SEARCH_LIMIT: usize = 10;

#[derive(Serialize)]
pub struct RunnerDetail {
    pub id: i32,
    pub name: String,
    pub team_name: String,
    pub van_number: i32,
    pub run_order: i32,
    pub projected_pace: f64,
    pub legs: Vec<RunnerLegDetail>,
}

#[derive(Serialize)]
pub struct TeamRunnerDetail {
    pub runner: Runner,
    pub legs: Vec<RunnerLegDetail>,
}

#[derive(Serialize)]
pub struct TeamDetail {
    pub team: Team,
    pub standing: Option<TeamStanding>,
    pub runners: Vec<TeamRunnerDetail>,
}

/// # current standings
/// computed from the store on every call, independent of the broadcaster
#[get("/dashboard")]
pub fn get_standings(state: &State<AppState>) -> Result<Json<StandingsSnapshot>, ApiError> {
    let snapshot = handle_error_http!(
        StandingsBroadcaster::compute(state.repository.as_ref(), &state.config),
        "routes/api/dashboard:get_standings",
        "standings"
    );

    Ok(Json(snapshot))
}

/// # standings stream
/// sends the latest standings right away and then every time they change.
/// every event carries the full list.
#[get("/dashboard/stream")]
pub fn stream(state: &State<AppState>, mut shutdown: Shutdown) -> EventStream![] {
    let mut standings = state.standings.clone();

    EventStream! {
        let current = standings.borrow_and_update().clone();
        yield Event::json(&current).event(STANDINGS_EVENT);

        loop {
            select! {
                changed = standings.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = &mut shutdown => break,
            };

            let latest = standings.borrow_and_update().clone();
            yield Event::json(&latest).event(STANDINGS_EVENT);
        }
    }
}

#[get("/dashboard/leg-results")]
pub fn leg_results(state: &State<AppState>) -> Result<Json<Vec<LegBoard>>, ApiError> {
    let snapshot = handle_error_http!(
        state.repository.snapshot(),
        "routes/api/dashboard:leg_results",
        "race snapshot"
    );

    Ok(Json(LeaderboardHelper::leg_boards(&snapshot)))
}

#[get("/dashboard/kills")]
pub fn kills(state: &State<AppState>) -> Result<Json<Vec<KillsEntry>>, ApiError> {
    let snapshot = handle_error_http!(
        state.repository.snapshot(),
        "routes/api/dashboard:kills",
        "race snapshot"
    );
    let standings = StandingsHelper::from_snapshot(&snapshot, &state.config);

    Ok(Json(LeaderboardHelper::kills_leaderboard(&standings)))
}

#[get("/dashboard/legs")]
pub fn legs(state: &State<AppState>) -> Result<Json<Vec<Leg>>, ApiError> {
    let legs = handle_error_http!(state.repository.list_legs(), "routes/api/dashboard:legs", "legs");

    Ok(Json(legs))
}

#[get("/dashboard/team/<team_id>")]
pub fn team(team_id: i32, state: &State<AppState>) -> Result<Json<TeamDetail>, ApiError> {
    let snapshot = handle_error_http!(
        state.repository.snapshot(),
        "routes/api/dashboard:team",
        format!("team {}", team_id)
    );

    let roster = match snapshot.teams.iter().find(|roster| roster.team.id == team_id) {
        Some(roster) => roster,
        None => return Err(NotFoundSnafu { what: format!("team {}", team_id) }.build().into()),
    };

    let standing = StandingsHelper::from_snapshot(&snapshot, &state.config)
        .into_iter()
        .find(|standing| standing.team.id == team_id);

    let runners = roster
        .runners
        .iter()
        .map(|runner| {
            let results = snapshot.results.get(&runner.id).map(Vec::as_slice).unwrap_or(&[]);
            TeamRunnerDetail {
                runner: runner.clone(),
                legs: LeaderboardHelper::runner_leg_details(runner, &snapshot.legs, results, &state.config),
            }
        })
        .collect();

    Ok(Json(TeamDetail {
        team: roster.team.clone(),
        standing,
        runners,
    }))
}

/// # search runners by name
/// queries shorter than two characters return nothing
#[get("/dashboard/runners/search?<q>")]
pub fn search_runners(q: Option<&str>, state: &State<AppState>) -> Result<Json<Vec<RunnerSearchHit>>, ApiError> {
    let query = q.unwrap_or("").trim();
    if query.chars().count() < MIN_SEARCH_LENGTH {
        return Ok(Json(Vec::new()));
    }

    let hits = handle_error_http!(
        state.repository.search_runners(query, SEARCH_LIMIT),
        "routes/api/dashboard:search_runners",
        format!("runners matching {}", query)
    );

    Ok(Json(hits))
}

#[get("/dashboard/runners/<runner_id>")]
pub fn runner(runner_id: i32, state: &State<AppState>) -> Result<Json<RunnerDetail>, ApiError> {
    let target = "routes/api/dashboard:runner";

    let runner = match handle_error_http!(state.repository.find_runner(runner_id), target, "runner") {
        Some(runner) => runner,
        None => return Err(NotFoundSnafu { what: format!("runner {}", runner_id) }.build().into()),
    };
    let team = handle_error_http!(state.repository.find_team(runner.team_id), target, "team of runner");
    let legs = handle_error_http!(state.repository.list_legs(), target, "legs");
    let results = handle_error_http!(state.repository.runner_results(runner.id), target, "runner results");

    Ok(Json(RunnerDetail {
        legs: LeaderboardHelper::runner_leg_details(&runner, &legs, &results, &state.config),
        team_name: team.map(|roster| roster.team.name).unwrap_or_default(),
        id: runner.id,
        name: runner.name,
        van_number: runner.van_number,
        run_order: runner.run_order,
        projected_pace: runner.projected_pace,
    }))
}
