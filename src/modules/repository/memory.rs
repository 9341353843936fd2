use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::errors::{CustomResult, NotFoundSnafu};
use crate::modules::models::leg::Leg;
use crate::modules::models::leg_result::{LegResult, NewLegResult};
use crate::modules::models::runner::Runner;
use crate::modules::models::team::{Team, TeamRoster};
use crate::modules::repository::{RaceRepository, RaceSnapshot, RunnerSearchHit};

#[derive(Default)]
struct RaceState {
    teams: Vec<Team>,
    runners: Vec<Runner>,
    legs: Vec<Leg>,
    results: Vec<LegResult>,
    next_result_id: i32,
}

impl RaceState {
    fn roster(&self, team: &Team) -> TeamRoster {
        let mut runners: Vec<Runner> = self
            .runners
            .iter()
            .filter(|runner| runner.team_id == team.id)
            .cloned()
            .collect();
        runners.sort_by_key(|runner| (runner.van_number, runner.run_order));

        TeamRoster {
            team: team.clone(),
            runners,
        }
    }
}

/// # in memory repository
/// keeps the whole race behind a single lock. reads share the lock, so a
/// snapshot is always consistent.
#[derive(Default)]
pub struct InMemoryRaceRepository {
    state: RwLock<RaceState>,
}

impl InMemoryRaceRepository {
    pub fn new() -> InMemoryRaceRepository {
        InMemoryRaceRepository::default()
    }

    /************ BUILDERS ************/
    pub fn with_team(self, team: Team, runners: Vec<Runner>) -> InMemoryRaceRepository {
        {
            let mut state = self.state.write();
            state.teams.push(team);
            state.runners.extend(runners);
        }
        self
    }

    pub fn with_legs(self, legs: Vec<Leg>) -> InMemoryRaceRepository {
        self.state.write().legs.extend(legs);
        self
    }

    /// load a race snapshot, the ids of the results are kept
    pub fn from_snapshot(snapshot: RaceSnapshot) -> InMemoryRaceRepository {
        let mut state = RaceState::default();
        for roster in snapshot.teams {
            state.teams.push(roster.team);
            state.runners.extend(roster.runners);
        }
        state.legs = snapshot.legs;
        state.results = snapshot.results.into_values().flatten().collect();
        state.next_result_id = state.results.iter().map(|result| result.id).max().unwrap_or(0);

        InMemoryRaceRepository {
            state: RwLock::new(state),
        }
    }

    /************ SETTERS ************/
    pub fn set_captains(&self, team_id: i32, van1: Option<i32>, van2: Option<i32>) -> CustomResult<()> {
        let mut state = self.state.write();
        let team = match state.teams.iter_mut().find(|team| team.id == team_id) {
            Some(team) => team,
            None => {
                return NotFoundSnafu {
                    what: format!("team {}", team_id),
                }
                .fail()
            }
        };

        team.van1_captain_id = van1;
        team.van2_captain_id = van2;
        Ok(())
    }
}

impl RaceRepository for InMemoryRaceRepository {
    fn list_teams(&self) -> CustomResult<Vec<TeamRoster>> {
        let state = self.state.read();
        let mut teams: Vec<&Team> = state.teams.iter().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(teams.into_iter().map(|team| state.roster(team)).collect())
    }

    fn list_legs(&self) -> CustomResult<Vec<Leg>> {
        let mut legs = self.state.read().legs.clone();
        legs.sort_by_key(|leg| leg.leg_number);

        Ok(legs)
    }

    fn list_results_grouped(&self) -> CustomResult<HashMap<i32, Vec<LegResult>>> {
        Ok(RaceSnapshot::group_results(self.state.read().results.clone()))
    }

    fn find_runner(&self, runner_id: i32) -> CustomResult<Option<Runner>> {
        Ok(self
            .state
            .read()
            .runners
            .iter()
            .find(|runner| runner.id == runner_id)
            .cloned())
    }

    fn find_runner_by_pin(&self, pin: &str) -> CustomResult<Option<Runner>> {
        Ok(self
            .state
            .read()
            .runners
            .iter()
            .find(|runner| runner.pin == pin)
            .cloned())
    }

    fn find_team(&self, team_id: i32) -> CustomResult<Option<TeamRoster>> {
        let state = self.state.read();

        Ok(state
            .teams
            .iter()
            .find(|team| team.id == team_id)
            .map(|team| state.roster(team)))
    }

    fn find_leg(&self, leg_number: i32) -> CustomResult<Option<Leg>> {
        Ok(self
            .state
            .read()
            .legs
            .iter()
            .find(|leg| leg.leg_number == leg_number)
            .cloned())
    }

    fn runner_results(&self, runner_id: i32) -> CustomResult<Vec<LegResult>> {
        let mut results: Vec<LegResult> = self
            .state
            .read()
            .results
            .iter()
            .filter(|result| result.runner_id == runner_id)
            .cloned()
            .collect();
        results.sort_by_key(|result| result.leg_number);

        Ok(results)
    }

    fn search_runners(&self, query: &str, limit: usize) -> CustomResult<Vec<RunnerSearchHit>> {
        let state = self.state.read();
        let needle = query.to_lowercase();

        let mut hits: Vec<RunnerSearchHit> = state
            .runners
            .iter()
            .filter(|runner| runner.name.to_lowercase().contains(&needle))
            .map(|runner| RunnerSearchHit {
                id: runner.id,
                name: runner.name.clone(),
                team_name: state
                    .teams
                    .iter()
                    .find(|team| team.id == runner.team_id)
                    .map(|team| team.name.clone())
                    .unwrap_or_default(),
            })
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits.truncate(limit);

        Ok(hits)
    }

    fn upsert_result(&self, new_result: &NewLegResult) -> CustomResult<LegResult> {
        let mut state = self.state.write();

        if !state.runners.iter().any(|runner| runner.id == new_result.runner_id) {
            return NotFoundSnafu {
                what: format!("runner {}", new_result.runner_id),
            }
            .fail();
        }

        let now = Utc::now().naive_utc();
        let existing = state
            .results
            .iter_mut()
            .find(|result| result.leg_number == new_result.leg_number && result.runner_id == new_result.runner_id);

        if let Some(result) = existing {
            result.clock_time = new_result.clock_time;
            result.kills = new_result.kills;
            result.entered_by = new_result.entered_by;
            result.updated_at = now;
            return Ok(result.clone());
        }

        state.next_result_id += 1;
        let result = LegResult {
            id: state.next_result_id,
            leg_number: new_result.leg_number,
            runner_id: new_result.runner_id,
            clock_time: new_result.clock_time,
            kills: new_result.kills,
            entered_by: new_result.entered_by,
            created_at: now,
            updated_at: now,
        };
        state.results.push(result.clone());

        Ok(result)
    }

    fn snapshot(&self) -> CustomResult<RaceSnapshot> {
        let state = self.state.read();
        let mut teams: Vec<&Team> = state.teams.iter().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        let mut legs = state.legs.clone();
        legs.sort_by_key(|leg| leg.leg_number);

        Ok(RaceSnapshot {
            teams: teams.into_iter().map(|team| state.roster(team)).collect(),
            legs,
            results: RaceSnapshot::group_results(state.results.clone()),
        })
    }
}
