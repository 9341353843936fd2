use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::select;
use log::error;
use serde::{Deserialize, Serialize};

use crate::schema::runners;

/// projected pace used when an admin does not supply one (7:00/mi)
pub const DEFAULT_PROJECTED_PACE: f64 = 420.0;

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = runners)]
pub struct NewRunner {
    pub team_id: i32,
    pub name: String,
    pub van_number: i32,
    pub run_order: i32,
    pub projected_pace: f64,
    pub pin: String,
}

/// # runner
/// a single member of a team. the legs a runner runs are never stored, they
/// are derived from `van_number` and `run_order`.
///
/// the pin is never serialized, standings and runner details are broadcast
/// to anyone watching the dashboard.
#[derive(Queryable, Identifiable, Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Runner {
    pub id: i32,
    pub team_id: i32,
    pub name: String,
    pub van_number: i32,
    pub run_order: i32,
    pub projected_pace: f64,
    #[serde(skip_serializing, default)]
    pub pin: String,
}

/// the part of a runner that is shown next to a standing
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RunnerSummary {
    pub id: i32,
    pub name: String,
}

impl From<&Runner> for RunnerSummary {
    fn from(runner: &Runner) -> Self {
        RunnerSummary {
            id: runner.id,
            name: runner.name.clone(),
        }
    }
}

impl Runner {
    /************ INSERTERS ************/
    /// # insert a new runner
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `new_runner` - the runner to insert, its pin must be unique
    ///
    /// ## Returns
    /// * `Runner` - the inserted runner
    pub fn new(conn: &mut PgConnection, new_runner: &NewRunner) -> QueryResult<Runner> {
        match diesel::insert_into(runners::table)
            .values(new_runner)
            .get_result::<Runner>(conn)
        {
            Ok(runner) => Ok(runner),
            Err(error) => {
                error!(target:"models/runner:new", "Error inserting runner {}: {}", new_runner.name, error);
                Err(error)
            }
        }
    }

    /************ GETTERS ************/
    pub fn get_all(conn: &mut PgConnection) -> QueryResult<Vec<Runner>> {
        use crate::schema::runners::dsl::*;

        runners
            .order((team_id.asc(), van_number.asc(), run_order.asc()))
            .load::<Runner>(conn)
    }

    pub fn get_by_id(conn: &mut PgConnection, id_in: i32) -> QueryResult<Runner> {
        use crate::schema::runners::dsl::*;

        runners.filter(id.eq(id_in)).first::<Runner>(conn)
    }

    /// # get runner by pin
    /// pins are unique across all runners, so at most one runner matches
    pub fn get_by_pin(conn: &mut PgConnection, pin_in: &str) -> QueryResult<Runner> {
        use crate::schema::runners::dsl::*;

        runners.filter(pin.eq(pin_in)).first::<Runner>(conn)
    }

    pub fn pin_exists(conn: &mut PgConnection, pin_in: &str) -> QueryResult<bool> {
        use crate::schema::runners::dsl::*;

        select(exists(runners.filter(pin.eq(pin_in)))).get_result(conn)
    }

    /// # get the runners of a team
    /// ordered by van and then by run order
    pub fn from_team(conn: &mut PgConnection, team_id_in: i32) -> QueryResult<Vec<Runner>> {
        use crate::schema::runners::dsl::*;

        runners
            .filter(team_id.eq(team_id_in))
            .order((van_number.asc(), run_order.asc()))
            .load::<Runner>(conn)
    }

    /// # search runners by name
    /// case insensitive substring match
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `query` - the part of the name to look for
    /// * `limit` - the maximum amount of runners to return
    pub fn search_by_name(conn: &mut PgConnection, query: &str, limit: i64) -> QueryResult<Vec<Runner>> {
        use crate::schema::runners::dsl::*;

        runners
            .filter(name.ilike(format!("%{}%", query)))
            .order(name.asc())
            .limit(limit)
            .load::<Runner>(conn)
    }

    /************ SETTERS ************/
    pub fn set_pin(conn: &mut PgConnection, id_in: i32, pin_in: &str) -> QueryResult<Runner> {
        use crate::schema::runners::dsl::*;

        diesel::update(runners.filter(id.eq(id_in)))
            .set(pin.eq(pin_in))
            .get_result::<Runner>(conn)
    }
}
