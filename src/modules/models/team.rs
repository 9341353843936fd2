use std::fmt;
use std::io::Write;
use std::str::FromStr;

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgConnection, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use log::error;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, DatabaseSnafu, InvalidInputSnafu};
use crate::modules::models::runner::Runner;
use crate::schema::teams;

/// the cities teams are entered from
#[derive(AsExpression, FromSqlRow, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[diesel(sql_type = Text)]
pub enum City {
    Houston,
    Dallas,
}

impl City {
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Houston => "Houston",
            City::Dallas => "Dallas",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for City {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Houston" => Ok(City::Houston),
            "Dallas" => Ok(City::Dallas),
            other => InvalidInputSnafu {
                reason: format!("unknown city: {}", other),
            }
            .fail(),
        }
    }
}

impl ToSql<Text, Pg> for City {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for City {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        raw.parse::<City>().map_err(|e| e.to_string().into())
    }
}

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub name: String,
    pub city: City,
    pub color: String,
}

impl NewTeam {
    /// # new team
    /// team names are stored uppercase, a missing color falls back to the
    /// default blue.
    pub fn new(name: &str, city: City, color: Option<&str>) -> NewTeam {
        NewTeam {
            name: normalize_team_name(name),
            city,
            color: color.unwrap_or(DEFAULT_TEAM_COLOR).to_string(),
        }
    }
}

pub const DEFAULT_TEAM_COLOR: &str = "#3b82f6";

pub fn normalize_team_name(name: &str) -> String {
    name.trim().to_uppercase()
}

#[derive(Queryable, Identifiable, Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub city: City,
    pub color: String,
    pub van1_captain_id: Option<i32>,
    pub van2_captain_id: Option<i32>,
}

impl Team {
    /// # is van captain
    /// check if the given runner captains the given van of this team. races
    /// have at most `MAX_VANS` vans, one captain column each.
    ///
    /// ## Arguments
    /// * `runner_id` - the runner to check
    /// * `van_number` - the van the runner claims to captain
    pub fn is_captain(&self, runner_id: i32, van_number: i32) -> bool {
        match van_number {
            1 => self.van1_captain_id == Some(runner_id),
            2 => self.van2_captain_id == Some(runner_id),
            _ => false,
        }
    }

    /************ INSERTERS ************/
    pub fn new(conn: &mut PgConnection, new_team: &NewTeam) -> CustomResult<Team> {
        diesel::insert_into(teams::table)
            .values(new_team)
            .get_result::<Team>(conn)
            .map_err(|e| {
                error!(target:"models/team:new", "Error creating team {}: {}", new_team.name, e);
                e
            })
            .context(DatabaseSnafu)
    }

    /************ GETTERS ************/
    /// # get all teams
    /// sorted by name so the standings input order is stable between reads
    pub fn get_all(conn: &mut PgConnection) -> QueryResult<Vec<Team>> {
        use crate::schema::teams::dsl::*;

        teams.order(name.asc()).load::<Team>(conn)
    }

    pub fn get_by_id(conn: &mut PgConnection, id_in: i32) -> QueryResult<Team> {
        use crate::schema::teams::dsl::*;

        teams.filter(id.eq(id_in)).first::<Team>(conn)
    }

    pub fn get_runners(&self, conn: &mut PgConnection) -> QueryResult<Vec<Runner>> {
        Runner::from_team(conn, self.id)
    }

    /************ SETTERS ************/
    pub fn set_captains(
        conn: &mut PgConnection,
        id_in: i32,
        van1: Option<i32>,
        van2: Option<i32>,
    ) -> QueryResult<Team> {
        use crate::schema::teams::dsl::*;

        diesel::update(teams.filter(id.eq(id_in)))
            .set((van1_captain_id.eq(van1), van2_captain_id.eq(van2)))
            .get_result::<Team>(conn)
    }
}

/// a team together with its roster, the unit the standings are computed over
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TeamRoster {
    pub team: Team,
    pub runners: Vec<Runner>,
}

impl TeamRoster {
    pub fn runner(&self, runner_id: i32) -> Option<&Runner> {
        self.runners.iter().find(|runner| runner.id == runner_id)
    }
}
