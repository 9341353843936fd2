use std::sync::Arc;

use log::info;
use rocket::{launch, Build, Rocket};

use relay_race_standings::app::{build_rocket, AppState};
use relay_race_standings::modules::config::AppConfig;
use relay_race_standings::modules::events::{AuditLog, EventBus, StandingsBroadcaster};
use relay_race_standings::modules::helpers::logging::setup_logging;
use relay_race_standings::modules::repository::postgres::PgRaceRepository;
use relay_race_standings::modules::repository::RaceRepository;

#[launch]
async fn rocket() -> Rocket<Build> {
    setup_logging().expect("Failed to setup logging");

    // a broken race config is fatal, nothing can be ranked with it
    let config = AppConfig::from_env().expect("Failed to load configuration");
    info!(
        target:"main",
        "starting race with {} legs, {} runners per van and {} legs per van",
        config.race.total_legs, config.race.runners_per_van, config.race.legs_per_van
    );

    let repository: Arc<dyn RaceRepository> = Arc::new(PgRaceRepository::new(&config.database_url));
    let bus = EventBus::default();

    // subscribers of accepted results
    let (broadcaster, standings) = StandingsBroadcaster::new(Arc::clone(&repository), config.race);
    broadcaster.spawn(bus.subscribe());
    AuditLog::spawn(bus.subscribe());

    build_rocket(AppState::new(
        repository,
        config.race,
        bus,
        &config.admin_key,
        standings,
        config.allowed_origins(),
    ))
}
