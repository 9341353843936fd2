use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::{debug, error};
use snafu::ResultExt;

use crate::errors::{CustomResult, DatabaseSnafu};
use crate::modules::models::general::establish_connection;
use crate::modules::models::leg::Leg;
use crate::modules::models::leg_result::{LegResult, NewLegResult};
use crate::modules::models::runner::Runner;
use crate::modules::models::team::{Team, TeamRoster};
use crate::modules::repository::{RaceRepository, RaceSnapshot, RunnerSearchHit};

/// # postgres repository
/// opens a connection per call, nothing is cached between calls
pub struct PgRaceRepository {
    database_url: String,
}

impl PgRaceRepository {
    pub fn new(database_url: &str) -> PgRaceRepository {
        PgRaceRepository {
            database_url: database_url.to_string(),
        }
    }

    fn connection(&self) -> CustomResult<PgConnection> {
        establish_connection(&self.database_url)
    }

    fn load_rosters(conn: &mut PgConnection) -> QueryResult<Vec<TeamRoster>> {
        let all_teams = Team::get_all(conn)?;
        let mut runners_by_team: HashMap<i32, Vec<Runner>> = HashMap::new();
        for runner in Runner::get_all(conn)? {
            runners_by_team.entry(runner.team_id).or_default().push(runner);
        }

        Ok(all_teams
            .into_iter()
            .map(|team| TeamRoster {
                runners: runners_by_team.remove(&team.id).unwrap_or_default(),
                team,
            })
            .collect())
    }
}

impl RaceRepository for PgRaceRepository {
    fn list_teams(&self) -> CustomResult<Vec<TeamRoster>> {
        let conn = &mut self.connection()?;
        PgRaceRepository::load_rosters(conn).context(DatabaseSnafu)
    }

    fn list_legs(&self) -> CustomResult<Vec<Leg>> {
        let conn = &mut self.connection()?;
        Leg::get_all(conn).context(DatabaseSnafu)
    }

    fn list_results_grouped(&self) -> CustomResult<HashMap<i32, Vec<LegResult>>> {
        let conn = &mut self.connection()?;
        let results = LegResult::get_all(conn).context(DatabaseSnafu)?;

        Ok(RaceSnapshot::group_results(results))
    }

    fn find_runner(&self, runner_id: i32) -> CustomResult<Option<Runner>> {
        let conn = &mut self.connection()?;
        Runner::get_by_id(conn, runner_id).optional().context(DatabaseSnafu)
    }

    fn find_runner_by_pin(&self, pin: &str) -> CustomResult<Option<Runner>> {
        let conn = &mut self.connection()?;
        Runner::get_by_pin(conn, pin).optional().context(DatabaseSnafu)
    }

    fn find_team(&self, team_id: i32) -> CustomResult<Option<TeamRoster>> {
        let conn = &mut self.connection()?;
        let team = match Team::get_by_id(conn, team_id).optional().context(DatabaseSnafu)? {
            Some(team) => team,
            None => return Ok(None),
        };
        let runners = team.get_runners(conn).context(DatabaseSnafu)?;

        Ok(Some(TeamRoster { team, runners }))
    }

    fn find_leg(&self, leg_number: i32) -> CustomResult<Option<Leg>> {
        let conn = &mut self.connection()?;
        Leg::get_by_number(conn, leg_number).optional().context(DatabaseSnafu)
    }

    fn runner_results(&self, runner_id: i32) -> CustomResult<Vec<LegResult>> {
        let conn = &mut self.connection()?;
        LegResult::from_runner(conn, runner_id).context(DatabaseSnafu)
    }

    fn search_runners(&self, query: &str, limit: usize) -> CustomResult<Vec<RunnerSearchHit>> {
        let conn = &mut self.connection()?;
        let found = Runner::search_by_name(conn, query, limit as i64).context(DatabaseSnafu)?;
        let team_names: HashMap<i32, String> = Team::get_all(conn)
            .context(DatabaseSnafu)?
            .into_iter()
            .map(|team| (team.id, team.name))
            .collect();

        Ok(found
            .into_iter()
            .map(|runner| RunnerSearchHit {
                team_name: team_names.get(&runner.team_id).cloned().unwrap_or_default(),
                id: runner.id,
                name: runner.name,
            })
            .collect())
    }

    fn upsert_result(&self, new_result: &NewLegResult) -> CustomResult<LegResult> {
        let conn = &mut self.connection()?;
        LegResult::upsert(conn, new_result).context(DatabaseSnafu)
    }

    /// # consistent snapshot
    /// all three reads run in one repeatable read transaction, so a result
    /// written halfway is either fully in the snapshot or not at all
    fn snapshot(&self) -> CustomResult<RaceSnapshot> {
        let conn = &mut self.connection()?;

        let snapshot = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                Ok::<RaceSnapshot, diesel::result::Error>(RaceSnapshot {
                    teams: PgRaceRepository::load_rosters(conn)?,
                    legs: Leg::get_all(conn)?,
                    results: RaceSnapshot::group_results(LegResult::get_all(conn)?),
                })
            })
            .map_err(|e| {
                error!(target:"repository/postgres:snapshot", "Error reading race snapshot: {}", e);
                e
            })
            .context(DatabaseSnafu)?;

        debug!(
            target:"repository/postgres:snapshot",
            "read snapshot with {} teams and {} results",
            snapshot.teams.len(),
            snapshot.result_count()
        );

        Ok(snapshot)
    }
}
