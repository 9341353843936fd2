use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::modules::config::RaceConfig;
use crate::modules::helpers::leg_assignment::LegAssignment;
use crate::modules::helpers::pace::PaceHelper;
use crate::modules::helpers::standings::{TeamStanding, TeamSummary};
use crate::modules::models::leg::Leg;
use crate::modules::models::leg_result::LegResult;
use crate::modules::models::runner::{Runner, RunnerSummary};
use crate::modules::models::team::TeamRoster;
use crate::modules::repository::RaceSnapshot;

/// one result on the board of a single leg
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RankedLegResult {
    pub runner_id: i32,
    pub runner_name: String,
    pub team_name: String,
    pub clock_time: i32,
    pub pace: Option<f64>,
    pub kills: i32,
    pub rank: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegBoard {
    pub leg_number: i32,
    pub distance: f64,
    pub results: Vec<RankedLegResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KillsEntry {
    pub team: TeamSummary,
    pub total_kills: i64,
    pub completed_leg_count: i32,
    pub rank: i32,
}

/// the state of one of a runners assigned legs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunnerLegDetail {
    pub leg_number: i32,
    /// `None` when the leg is not in the leg list
    pub distance: Option<f64>,
    pub clock_time: Option<i32>,
    pub kills: i32,
    pub pace: Option<f64>,
}

impl RunnerLegDetail {
    pub fn is_completed(&self) -> bool {
        self.clock_time.is_some()
    }
}

/// a leg of a van as the captain sees it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VanLegStatus {
    pub leg_number: i32,
    pub distance: Option<f64>,
    pub runner: Option<RunnerSummary>,
    pub clock_time: Option<i32>,
    pub completed: bool,
}

pub struct LeaderboardHelper {}

impl LeaderboardHelper {
    /// # rank the results of one leg
    /// fastest first. equal clock times are ordered by runner id so the
    /// ranking does not depend on the order the results were read in.
    ///
    /// ## Arguments
    /// * `results` - the results of a single leg
    ///
    /// ## Returns
    /// * `Vec<(i32, &LegResult)>` - 1-based rank and result, best first
    pub fn rank_leg_results(results: &[LegResult]) -> Vec<(i32, &LegResult)> {
        let mut sorted: Vec<&LegResult> = results.iter().collect();
        sorted.sort_by(|a, b| a.clock_time.cmp(&b.clock_time).then(a.runner_id.cmp(&b.runner_id)));

        sorted
            .into_iter()
            .enumerate()
            .map(|(index, result)| (index as i32 + 1, result))
            .collect()
    }

    /// # boards for every leg
    /// one board per leg in leg number order, every board ranked with
    /// `rank_leg_results`. legs nobody finished yet get an empty board.
    pub fn leg_boards(snapshot: &RaceSnapshot) -> Vec<LegBoard> {
        let mut runners: HashMap<i32, (&Runner, &str)> = HashMap::new();
        for roster in &snapshot.teams {
            for runner in &roster.runners {
                runners.insert(runner.id, (runner, roster.team.name.as_str()));
            }
        }

        let mut by_leg: HashMap<i32, Vec<LegResult>> = HashMap::new();
        for result in snapshot.results.values().flatten() {
            by_leg.entry(result.leg_number).or_default().push(result.clone());
        }

        let mut legs: Vec<&Leg> = snapshot.legs.iter().collect();
        legs.sort_by_key(|leg| leg.leg_number);

        legs.into_iter()
            .map(|leg| {
                // results of runners outside every team are dropped before ranking
                let results: Vec<LegResult> = by_leg
                    .remove(&leg.leg_number)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|result| runners.contains_key(&result.runner_id))
                    .collect();
                let ranked = LeaderboardHelper::rank_leg_results(&results)
                    .into_iter()
                    .filter_map(|(rank, result)| {
                        let (runner, team_name) = runners.get(&result.runner_id)?;
                        Some(RankedLegResult {
                            runner_id: runner.id,
                            runner_name: runner.name.clone(),
                            team_name: team_name.to_string(),
                            clock_time: result.clock_time,
                            pace: PaceHelper::pace_from_result(result.clock_time, leg.distance),
                            kills: result.kills,
                            rank,
                        })
                    })
                    .collect();

                LegBoard {
                    leg_number: leg.leg_number,
                    distance: leg.distance,
                    results: ranked,
                }
            })
            .collect()
    }

    /// # kills leaderboard
    /// teams by total kills, most first. teams with the same amount keep the
    /// order of the standings.
    pub fn kills_leaderboard(standings: &[TeamStanding]) -> Vec<KillsEntry> {
        let mut sorted: Vec<&TeamStanding> = standings.iter().collect();
        sorted.sort_by(|a, b| b.total_kills.cmp(&a.total_kills));

        sorted
            .into_iter()
            .enumerate()
            .map(|(index, standing)| KillsEntry {
                team: standing.team.clone(),
                total_kills: standing.total_kills,
                completed_leg_count: standing.completed_leg_count,
                rank: index as i32 + 1,
            })
            .collect()
    }

    /// # details of a runners legs
    ///
    /// ## Arguments
    /// * `runner` - the runner
    /// * `legs` - all legs, used for the distances
    /// * `results` - the results of this runner
    /// * `config` - the race config
    ///
    /// ## Returns
    /// * `Vec<RunnerLegDetail>` - one entry per assigned leg, ascending
    pub fn runner_leg_details(
        runner: &Runner,
        legs: &[Leg],
        results: &[LegResult],
        config: &RaceConfig,
    ) -> Vec<RunnerLegDetail> {
        let distances = Leg::distance_map(legs);

        LegAssignment::legs_for_runner(runner, config)
            .into_iter()
            .map(|leg_number| {
                let distance = distances.get(&leg_number).copied();
                let result = results
                    .iter()
                    .find(|result| result.leg_number == leg_number && result.runner_id == runner.id);
                let clock_time = result.map(|result| result.clock_time);

                RunnerLegDetail {
                    leg_number,
                    distance,
                    clock_time,
                    kills: result.map(|result| result.kills).unwrap_or(0),
                    pace: match (clock_time, distance) {
                        (Some(time), Some(distance)) => PaceHelper::pace_from_result(time, distance),
                        _ => None,
                    },
                }
            })
            .collect()
    }

    /// # legs of a van
    /// every leg the van covers with the scheduled runner and, once run, the time
    ///
    /// ## Arguments
    /// * `roster` - the team
    /// * `van_number` - the van of that team
    /// * `legs` - all legs, used for the distances
    /// * `results_by_runner` - results keyed by runner id
    /// * `config` - the race config
    pub fn van_leg_status(
        roster: &TeamRoster,
        van_number: i32,
        legs: &[Leg],
        results_by_runner: &HashMap<i32, Vec<LegResult>>,
        config: &RaceConfig,
    ) -> Vec<VanLegStatus> {
        let distances = Leg::distance_map(legs);

        LegAssignment::van_legs(van_number, config)
            .into_iter()
            .map(|leg_number| {
                let runner = LegAssignment::runner_for_leg(leg_number, &roster.runners, config);
                let clock_time = runner
                    .and_then(|runner| results_by_runner.get(&runner.id))
                    .and_then(|results| results.iter().find(|result| result.leg_number == leg_number))
                    .map(|result| result.clock_time);

                VanLegStatus {
                    leg_number,
                    distance: distances.get(&leg_number).copied(),
                    runner: runner.map(RunnerSummary::from),
                    clock_time,
                    completed: clock_time.is_some(),
                }
            })
            .collect()
    }
}
