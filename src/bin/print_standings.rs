use std::env;
use std::process::exit;

use log::error;

use relay_race_standings::modules::config::AppConfig;
use relay_race_standings::modules::helpers::logging::setup_logging;
use relay_race_standings::modules::helpers::pace::PaceHelper;
use relay_race_standings::modules::helpers::standings::{StandingsHelper, TeamStanding};
use relay_race_standings::modules::repository::postgres::PgRaceRepository;
use relay_race_standings::modules::repository::RaceRepository;

/// one line per team, the way the dashboard shows it
fn format_standing(standing: &TeamStanding) -> String {
    let runner = standing
        .current_runner
        .as_ref()
        .map(|runner| runner.name.as_str())
        .unwrap_or("finished");

    format!(
        "{:>2}. {:<8} legs {:>2}  time {:>8}  {:<18} kills {:>3}  leg {:>2}: {}",
        standing.rank,
        standing.team.name,
        standing.completed_leg_count,
        PaceHelper::format_time(standing.total_elapsed_time),
        PaceHelper::format_pace_diff(standing.pace_vs_projected),
        standing.total_kills,
        standing.current_leg_number,
        runner
    )
}

/// prints the current standings, as a table or with `--json` as json
fn main() {
    setup_logging().expect("Error setting up logging");
    let as_json = env::args().any(|arg| arg == "--json");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(target:"print_standings", "Invalid configuration: {}", e);
            exit(1);
        }
    };

    let repository = PgRaceRepository::new(&config.database_url);
    let snapshot = match repository.snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(target:"print_standings", "Error reading race: {}", e);
            exit(1);
        }
    };
    let standings = StandingsHelper::from_snapshot(&snapshot, &config.race);

    if as_json {
        match serde_json::to_string_pretty(&standings) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!(target:"print_standings", "Error serializing standings: {}", e);
                exit(1);
            }
        }
        return;
    }

    for standing in &standings {
        println!("{}", format_standing(standing));
    }
}
