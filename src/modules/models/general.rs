use diesel::pg::PgConnection;
use diesel::Connection;
use log::error;
use snafu::ResultExt;

use crate::errors::{ConnectionSnafu, CustomResult};

/// # establish a database connection
///
/// ## Arguments
/// * `database_url` - the postgres url
///
/// ## Returns
/// * `PgConnection` - a fresh connection
pub fn establish_connection(database_url: &str) -> CustomResult<PgConnection> {
    PgConnection::establish(database_url)
        .map_err(|e| {
            error!(target:"models/general:establish_connection", "Error connecting to database: {}", e);
            e
        })
        .context(ConnectionSnafu)
}
