use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::CustomResult;
use crate::modules::models::leg::Leg;
use crate::modules::models::leg_result::{LegResult, NewLegResult};
use crate::modules::models::runner::Runner;
use crate::modules::models::team::TeamRoster;

pub mod memory;
pub mod postgres;

/// # race snapshot
/// everything the standings are computed from, read at a single point in time
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RaceSnapshot {
    pub teams: Vec<TeamRoster>,
    pub legs: Vec<Leg>,
    /// results keyed by runner id
    pub results: HashMap<i32, Vec<LegResult>>,
}

impl RaceSnapshot {
    pub fn group_results(results: Vec<LegResult>) -> HashMap<i32, Vec<LegResult>> {
        let mut grouped: HashMap<i32, Vec<LegResult>> = HashMap::new();
        for result in results {
            grouped.entry(result.runner_id).or_default().push(result);
        }

        grouped
    }

    pub fn result_count(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }
}

/// a runner found by name, with the team they run for
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunnerSearchHit {
    pub id: i32,
    pub name: String,
    pub team_name: String,
}

/// # race repository
/// the storage the standings, ingestion and routes read from and write to.
/// implementations must be usable from multiple threads at once.
pub trait RaceRepository: Send + Sync {
    /// every team with its runners, teams by name and runners by van and run order
    fn list_teams(&self) -> CustomResult<Vec<TeamRoster>>;

    /// every leg by leg number
    fn list_legs(&self) -> CustomResult<Vec<Leg>>;

    /// every result keyed by runner id
    fn list_results_grouped(&self) -> CustomResult<HashMap<i32, Vec<LegResult>>>;

    fn find_runner(&self, runner_id: i32) -> CustomResult<Option<Runner>>;

    fn find_runner_by_pin(&self, pin: &str) -> CustomResult<Option<Runner>>;

    fn find_team(&self, team_id: i32) -> CustomResult<Option<TeamRoster>>;

    fn find_leg(&self, leg_number: i32) -> CustomResult<Option<Leg>>;

    fn runner_results(&self, runner_id: i32) -> CustomResult<Vec<LegResult>>;

    /// case insensitive substring search on runner names
    fn search_runners(&self, query: &str, limit: usize) -> CustomResult<Vec<RunnerSearchHit>>;

    /// # store a result
    /// insert the result, or overwrite the existing result of the same
    /// (leg, runner) pair. the last write wins.
    fn upsert_result(&self, new_result: &NewLegResult) -> CustomResult<LegResult>;

    /// # consistent snapshot
    /// teams, legs and results as they were at one moment. the default reads
    /// them one after another, backends with transactions should override it.
    fn snapshot(&self) -> CustomResult<RaceSnapshot> {
        Ok(RaceSnapshot {
            teams: self.list_teams()?,
            legs: self.list_legs()?,
            results: self.list_results_grouped()?,
        })
    }
}
