use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::config::RaceConfig;
use crate::modules::helpers::leg_assignment::LegAssignment;
use crate::modules::helpers::math::Math;
use crate::modules::models::leg::Leg;
use crate::modules::models::leg_result::LegResult;
use crate::modules::models::runner::{Runner, RunnerSummary};
use crate::modules::models::team::{City, Team, TeamRoster};
use crate::modules::repository::RaceSnapshot;

/// leg length assumed for the projection when no leg distances are known
pub const ASSUMED_LEG_DISTANCE_MILES: f64 = 5.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub id: i32,
    pub name: String,
    pub city: City,
    pub color: String,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        TeamSummary {
            id: team.id,
            name: team.name.clone(),
            city: team.city,
            color: team.color.clone(),
        }
    }
}

/// # team standing
/// the derived state of one team. never stored, computed from a snapshot
/// every time it is needed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TeamStanding {
    pub team: TeamSummary,
    pub completed_leg_count: i32,
    /// sum of all clock times of the team, in seconds
    pub total_elapsed_time: i64,
    pub current_leg_number: i32,
    /// `None` once the team has finished, or when nobody is assigned to the leg
    pub current_runner: Option<RunnerSummary>,
    pub total_kills: i64,
    /// estimate in seconds, not used for the ranking
    pub projected_time: f64,
    /// seconds behind the leader. zero for the leader and for teams that have not started
    pub pace_vs_projected: i64,
    pub rank: i32,
}

/// # standings snapshot
/// the full leaderboard as it is pushed to observers. a client can replace
/// its whole view with any single snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StandingsSnapshot {
    pub standings: Vec<TeamStanding>,
    pub last_update: DateTime<Utc>,
}

impl StandingsSnapshot {
    pub fn new(standings: Vec<TeamStanding>) -> StandingsSnapshot {
        StandingsSnapshot {
            standings,
            last_update: Utc::now(),
        }
    }

    pub fn empty() -> StandingsSnapshot {
        StandingsSnapshot::new(Vec::new())
    }
}

pub struct StandingsHelper {}

impl StandingsHelper {
    /// # compute the standings
    /// turns the raw results into the ranked leaderboard. pure: the same input
    /// always gives the same output and nothing outside the arguments is read.
    ///
    /// the results are expected to be validated already: every result belongs
    /// to a runner on one of the teams, on one of that runners legs, with a
    /// positive clock time. results of runners that are not on any team are
    /// ignored.
    ///
    /// ## Arguments
    /// * `teams` - the teams and their runners, in the order ties are resolved
    /// * `results_by_runner` - the leg results keyed by runner id
    /// * `legs` - the legs, only used for the projection. may be empty
    /// * `config` - the race config
    ///
    /// ## Returns
    /// * `Vec<TeamStanding>` - the standings ordered by rank
    pub fn compute_standings(
        teams: &[TeamRoster],
        results_by_runner: &HashMap<i32, Vec<LegResult>>,
        legs: &[Leg],
        config: &RaceConfig,
    ) -> Vec<TeamStanding> {
        let distances = Leg::distance_map(legs);
        let average_distance = Math::mean(&distances.values().copied().collect::<Vec<f64>>())
            .unwrap_or(ASSUMED_LEG_DISTANCE_MILES);

        let mut standings: Vec<TeamStanding> = teams
            .iter()
            .map(|roster| {
                StandingsHelper::standing_for_team(roster, results_by_runner, &distances, average_distance, config)
            })
            .collect();

        StandingsHelper::rank(&mut standings);

        standings
    }

    pub fn from_snapshot(snapshot: &RaceSnapshot, config: &RaceConfig) -> Vec<TeamStanding> {
        StandingsHelper::compute_standings(&snapshot.teams, &snapshot.results, &snapshot.legs, config)
    }

    /// # results of a team
    /// all results of all runners on the team, in roster order
    pub fn team_results<'a>(
        roster: &TeamRoster,
        results_by_runner: &'a HashMap<i32, Vec<LegResult>>,
    ) -> Vec<&'a LegResult> {
        roster
            .runners
            .iter()
            .filter_map(|runner| results_by_runner.get(&runner.id))
            .flatten()
            .collect()
    }

    fn standing_for_team(
        roster: &TeamRoster,
        results_by_runner: &HashMap<i32, Vec<LegResult>>,
        distances: &HashMap<i32, f64>,
        average_distance: f64,
        config: &RaceConfig,
    ) -> TeamStanding {
        let results = StandingsHelper::team_results(roster, results_by_runner);

        let completed_leg_count = results.len() as i32;
        let total_elapsed_time: i64 = results.iter().map(|result| i64::from(result.clock_time)).sum();
        let total_kills: i64 = results.iter().map(|result| i64::from(result.kills)).sum();

        let current_leg_number = (completed_leg_count + 1).min(config.total_legs);
        let current_runner = if completed_leg_count < config.total_legs {
            LegAssignment::runner_for_leg(current_leg_number, &roster.runners, config).map(RunnerSummary::from)
        } else {
            None
        };

        TeamStanding {
            team: TeamSummary::from(&roster.team),
            completed_leg_count,
            total_elapsed_time,
            current_leg_number,
            current_runner,
            total_kills,
            projected_time: StandingsHelper::projected_time(&roster.runners, distances, average_distance, config),
            pace_vs_projected: 0,
            rank: 0,
        }
    }

    /// # projected race time of a roster
    /// every runner's projected pace times the distance of each of their legs.
    /// legs without a known distance count as `average_distance`.
    pub fn projected_time(
        runners: &[Runner],
        distances: &HashMap<i32, f64>,
        average_distance: f64,
        config: &RaceConfig,
    ) -> f64 {
        runners
            .iter()
            .map(|runner| {
                LegAssignment::legs_for_runner(runner, config)
                    .iter()
                    .map(|leg| runner.projected_pace * distances.get(leg).copied().unwrap_or(average_distance))
                    .sum::<f64>()
            })
            .sum()
    }

    /// # rank standings
    /// more completed legs first, then less elapsed time. the sort is stable so
    /// full ties keep their input order and get consecutive ranks.
    pub fn rank(standings: &mut [TeamStanding]) {
        standings.sort_by(|a, b| {
            b.completed_leg_count
                .cmp(&a.completed_leg_count)
                .then(a.total_elapsed_time.cmp(&b.total_elapsed_time))
        });

        for (index, standing) in standings.iter_mut().enumerate() {
            standing.rank = index as i32 + 1;
        }

        let leader_time = standings
            .first()
            .filter(|leader| leader.completed_leg_count > 0)
            .map(|leader| leader.total_elapsed_time);

        for standing in standings.iter_mut() {
            standing.pace_vs_projected = match leader_time {
                Some(leader_time) if standing.completed_leg_count > 0 => standing.total_elapsed_time - leader_time,
                _ => 0,
            };
        }
    }
}
