use std::env;
use std::process::exit;

use log::{error, info};

use relay_race_standings::modules::config::AppConfig;
use relay_race_standings::modules::helpers::logging::setup_logging;
use relay_race_standings::modules::helpers::pin::PinHelper;
use relay_race_standings::modules::models::general::establish_connection;
use relay_race_standings::modules::models::runner::Runner;

const MAX_PIN_ATTEMPTS: usize = 50;

/// gives a runner a new random pin. usage: `regenerate_pin <runner_id>`
fn main() {
    setup_logging().expect("Error setting up logging");

    let runner_id = match env::args().nth(1).and_then(|arg| arg.parse::<i32>().ok()) {
        Some(id) => id,
        None => {
            error!(target:"regenerate_pin", "usage: regenerate_pin <runner_id>");
            exit(2);
        }
    };

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(target:"regenerate_pin", "Invalid configuration: {}", e);
            exit(1);
        }
    };
    let conn = &mut match establish_connection(&config.database_url) {
        Ok(conn) => conn,
        Err(e) => {
            error!(target:"regenerate_pin", "{}", e);
            exit(1);
        }
    };

    // a failed lookup counts as taken
    let pin = match PinHelper::generate_unique_pin(
        |pin| Runner::pin_exists(conn, pin).unwrap_or(true),
        MAX_PIN_ATTEMPTS,
    ) {
        Some(pin) => pin,
        None => {
            error!(target:"regenerate_pin", "Could not find a free pin in {} attempts", MAX_PIN_ATTEMPTS);
            exit(1);
        }
    };

    match Runner::set_pin(conn, runner_id, &pin) {
        Ok(runner) => {
            info!(target:"regenerate_pin", "New pin for {} (runner {})", runner.name, runner.id);
            println!("{}", pin);
        }
        Err(diesel::result::Error::NotFound) => {
            error!(target:"regenerate_pin", "Runner {} does not exist", runner_id);
            exit(1);
        }
        Err(e) => {
            error!(target:"regenerate_pin", "Error updating pin of runner {}: {}", runner_id, e);
            exit(1);
        }
    }
}
