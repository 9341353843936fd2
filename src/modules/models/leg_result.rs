use std::fmt;
use std::io::Write;

use chrono::NaiveDateTime;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgConnection, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use log::error;
use serde::{Deserialize, Serialize};

use crate::schema::leg_results;

/// who entered a result
#[derive(AsExpression, FromSqlRow, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum EnteredBy {
    Runner,
    Captain,
    Admin,
    Import,
}

impl EnteredBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnteredBy::Runner => "runner",
            EnteredBy::Captain => "captain",
            EnteredBy::Admin => "admin",
            EnteredBy::Import => "import",
        }
    }
}

impl fmt::Display for EnteredBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql<Text, Pg> for EnteredBy {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for EnteredBy {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"runner" => Ok(EnteredBy::Runner),
            b"captain" => Ok(EnteredBy::Captain),
            b"admin" => Ok(EnteredBy::Admin),
            b"import" => Ok(EnteredBy::Import),
            other => Err(format!("unknown entered_by value: {}", String::from_utf8_lossy(other)).into()),
        }
    }
}

#[derive(Insertable, Serialize, Debug, Clone, Deserialize, PartialEq)]
#[diesel(table_name = leg_results)]
pub struct NewLegResult {
    pub leg_number: i32,
    pub runner_id: i32,
    pub clock_time: i32,
    pub kills: i32,
    pub entered_by: EnteredBy,
}

/// # leg result
/// one finished (leg, runner) pair. there is at most one per pair, a second
/// submission for the same pair overwrites the first.
#[derive(Queryable, Identifiable, Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct LegResult {
    pub id: i32,
    pub leg_number: i32,
    pub runner_id: i32,
    /// seconds the runner needed for the leg
    pub clock_time: i32,
    pub kills: i32,
    pub entered_by: EnteredBy,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl LegResult {
    /************ INSERTERS ************/
    /// # upsert a result
    /// insert the result or, when the runner already has a result for the leg,
    /// overwrite its time, kills and provenance. concurrent writes to the same
    /// pair are last write wins.
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `new_result` - the result to store
    ///
    /// ## Returns
    /// * `LegResult` - the stored row
    pub fn upsert(conn: &mut PgConnection, new_result: &NewLegResult) -> QueryResult<LegResult> {
        use crate::schema::leg_results::dsl::*;

        match diesel::insert_into(leg_results)
            .values(new_result)
            .on_conflict((leg_number, runner_id))
            .do_update()
            .set((
                clock_time.eq(new_result.clock_time),
                kills.eq(new_result.kills),
                entered_by.eq(new_result.entered_by),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<LegResult>(conn)
        {
            Ok(result) => Ok(result),
            Err(error) => {
                error!(
                    target:"models/leg_result:upsert",
                    "Error storing result for runner {} on leg {}: {}",
                    new_result.runner_id, new_result.leg_number, error
                );
                Err(error)
            }
        }
    }

    /************ GETTERS ************/
    pub fn get_all(conn: &mut PgConnection) -> QueryResult<Vec<LegResult>> {
        use crate::schema::leg_results::dsl::*;

        leg_results
            .order((leg_number.asc(), id.asc()))
            .load::<LegResult>(conn)
    }

    pub fn from_runner(conn: &mut PgConnection, runner_id_in: i32) -> QueryResult<Vec<LegResult>> {
        use crate::schema::leg_results::dsl::*;

        leg_results
            .filter(runner_id.eq(runner_id_in))
            .order(leg_number.asc())
            .load::<LegResult>(conn)
    }
}
