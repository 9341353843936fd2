use std::collections::HashSet;
use std::process::exit;

use diesel::pg::PgConnection;
use log::{error, info};
use rand::Rng;
use snafu::ResultExt;

use relay_race_standings::errors::{CustomResult, DatabaseSnafu, InvalidInputSnafu};
use relay_race_standings::modules::config::{AppConfig, RaceConfig};
use relay_race_standings::modules::helpers::logging::setup_logging;
use relay_race_standings::modules::helpers::pin::PinHelper;
use relay_race_standings::modules::models::general::establish_connection;
use relay_race_standings::modules::models::leg::{Leg, NewLeg};
use relay_race_standings::modules::models::runner::{NewRunner, Runner, DEFAULT_PROJECTED_PACE};
use relay_race_standings::modules::models::team::{City, NewTeam, Team};

const TEAMS: [(&str, City); 6] = [
    ("BLACK", City::Houston),
    ("BLUE", City::Houston),
    ("GREY", City::Houston),
    ("WHITE", City::Houston),
    ("RED", City::Dallas),
    ("GREEN", City::Dallas),
];

/// distance in miles, start lat/lng and end lat/lng of every leg
const LEGS: [(f64, f64, f64, f64, f64); 36] = [
    (5.22, 29.503671, -97.444339, 29.49606, -97.38505),
    (5.34, 29.49606, -97.38505, 29.47556, -97.30774),
    (4.86, 29.47556, -97.30774, 29.48651, -97.26951),
    (4.08, 29.48651, -97.26951, 29.46001, -97.22472),
    (3.92, 29.46001, -97.22472, 29.4309, -97.17125),
    (4.10, 29.4309, -97.17125, 29.48384, -97.19054),
    (3.71, 29.48384, -97.19054, 29.52661, -97.18093),
    (5.18, 29.52661, -97.18093, 29.58766, -97.17648),
    (4.68, 29.58766, -97.17648, 29.63681, -97.13134),
    (3.97, 29.63681, -97.13134, 29.68678, -97.10769),
    (4.31, 29.68678, -97.10769, 29.66852, -97.06731),
    (6.13, 29.66852, -97.06731, 29.67004, -96.97755),
    (6.05, 29.67004, -96.97755, 29.67986, -96.9061),
    (6.38, 29.67986, -96.9061, 29.65751, -96.82041),
    (5.33, 29.65751, -96.82041, 29.70267, -96.77938),
    (6.35, 29.70267, -96.77938, 29.69578, -96.69802),
    (6.78, 29.69578, -96.69802, 29.70202, -96.58678),
    (4.42, 29.70202, -96.58678, 29.68867, -96.53743),
    (3.70, 29.68867, -96.53743, 29.64193, -96.51491),
    (6.82, 29.64193, -96.51491, 29.57088, -96.45564),
    (6.82, 29.57088, -96.45564, 29.58562, -96.34902),
    (2.84, 29.58562, -96.34902, 29.58991, -96.31321),
    (6.52, 29.58991, -96.31321, 29.61015, -96.2076),
    (5.05, 29.61015, -96.2076, 29.62733, -96.12717),
    (6.08, 29.62733, -96.12717, 29.62058, -96.0348),
    (6.40, 29.62058, -96.0348, 29.64363, -95.97649),
    (2.79, 29.64363, -95.97649, 29.68339, -95.97825),
    (5.02, 29.68339, -95.97825, 29.69019, -95.89984),
    (4.69, 29.69019, -95.89984, 29.71801, -95.8466),
    (6.08, 29.71801, -95.8466, 29.73472, -95.76307),
    (5.32, 29.73472, -95.76307, 29.73495, -95.68676),
    (6.79, 29.73495, -95.68676, 29.76905, -95.64249),
    (6.63, 29.76905, -95.64249, 29.74816, -95.57221),
    (4.82, 29.74816, -95.57221, 29.7551, -95.49937),
    (5.97, 29.7551, -95.49937, 29.76124, -95.41966),
    (5.32, 29.76124, -95.41966, 29.77128, -95.34853),
];

fn seed_legs(conn: &mut PgConnection) -> CustomResult<()> {
    for (index, (distance, start_lat, start_lng, end_lat, end_lng)) in LEGS.iter().enumerate() {
        let new_leg = NewLeg {
            leg_number: index as i32 + 1,
            distance: *distance,
            difficulty: Some(NewLeg::difficulty_for(*distance).to_string()),
            start_lat: Some(*start_lat),
            start_lng: Some(*start_lng),
            end_lat: Some(*end_lat),
            end_lng: Some(*end_lng),
            ..NewLeg::default()
        };
        Leg::new(conn, &new_leg).context(DatabaseSnafu)?;
    }

    info!(target:"seed_race", "Created {} legs", LEGS.len());
    Ok(())
}

fn seed_team(
    conn: &mut PgConnection,
    name: &str,
    city: City,
    race: &RaceConfig,
    used_pins: &mut HashSet<String>,
) -> CustomResult<()> {
    let team = Team::new(conn, &NewTeam::new(name, city, None))?;
    let mut captains: Vec<Option<i32>> = vec![None; race.van_count() as usize];

    for van in 1..=race.van_count() {
        for order in 1..=race.runners_per_van {
            let pin = match PinHelper::generate_unique_pin(|pin| used_pins.contains(pin), 100) {
                Some(pin) => pin,
                None => return InvalidInputSnafu { reason: "ran out of unique pins" }.fail(),
            };
            used_pins.insert(pin.clone());

            let runner = Runner::new(
                conn,
                &NewRunner {
                    team_id: team.id,
                    name: format!("{} Van{} Runner{}", team.name, van, order),
                    van_number: van,
                    run_order: order,
                    projected_pace: DEFAULT_PROJECTED_PACE + f64::from(rand::thread_rng().gen_range(0..60_i32)),
                    pin,
                },
            )
            .context(DatabaseSnafu)?;

            if order == 1 {
                captains[(van - 1) as usize] = Some(runner.id);
            }
        }
    }

    Team::set_captains(
        conn,
        team.id,
        captains.first().copied().flatten(),
        captains.get(1).copied().flatten(),
    )
    .context(DatabaseSnafu)?;

    info!(target:"seed_race", "Created team {} with {} runners", team.name, race.runners_per_team());
    Ok(())
}

/// fills an empty database with the default race
fn main() {
    setup_logging().expect("Error setting up logging");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(target:"seed_race", "Invalid configuration: {}", e);
            exit(1);
        }
    };
    if config.race.total_legs as usize != LEGS.len() {
        error!(target:"seed_race", "The seed data only covers a race of {} legs", LEGS.len());
        exit(1);
    }

    let conn = &mut match establish_connection(&config.database_url) {
        Ok(conn) => conn,
        Err(e) => {
            error!(target:"seed_race", "{}", e);
            exit(1);
        }
    };

    match Team::get_all(conn) {
        Ok(teams) if teams.is_empty() => {}
        Ok(teams) => {
            error!(target:"seed_race", "Database already holds {} teams, not seeding", teams.len());
            exit(1);
        }
        Err(e) => {
            error!(target:"seed_race", "Error reading teams: {}", e);
            exit(1);
        }
    }

    if let Err(e) = seed_legs(conn) {
        error!(target:"seed_race", "Error creating legs: {}", e);
        exit(1);
    }

    let mut used_pins = HashSet::new();
    for (name, city) in TEAMS {
        if let Err(e) = seed_team(conn, name, city, &config.race, &mut used_pins) {
            error!(target:"seed_race", "Error creating team {}: {}", name, e);
            exit(1);
        }
    }

    info!(target:"seed_race", "Seed completed");
}
