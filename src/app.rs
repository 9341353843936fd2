use std::sync::Arc;

use rocket::http::Status;
use rocket::{catch, catchers, options, routes, Build, Request, Rocket};
use tokio::sync::watch;

use crate::errors::ApiError;
use crate::modules::config::RaceConfig;
use crate::modules::events::EventBus;
use crate::modules::helpers::fairings::cors::CORS;
use crate::modules::helpers::standings::StandingsSnapshot;
use crate::modules::ingestion::IngestionGateway;
use crate::modules::repository::RaceRepository;
use crate::routes::api;

/// # app state
/// everything the routes need, managed by rocket
pub struct AppState {
    pub repository: Arc<dyn RaceRepository>,
    pub config: RaceConfig,
    pub ingestion: IngestionGateway,
    pub standings: watch::Receiver<StandingsSnapshot>,
    pub allowed_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn RaceRepository>,
        config: RaceConfig,
        bus: EventBus,
        admin_key: &str,
        standings: watch::Receiver<StandingsSnapshot>,
        allowed_origins: Vec<String>,
    ) -> AppState {
        AppState {
            ingestion: IngestionGateway::new(Arc::clone(&repository), bus, config, admin_key),
            repository,
            config,
            standings,
            allowed_origins,
        }
    }
}

#[options("/<_..>")]
fn preflight() -> Status {
    Status::NoContent
}

#[catch(default)]
fn default_catcher(status: Status, _request: &Request) -> ApiError {
    ApiError::new(status, status.reason().unwrap_or("error"))
}

/// # build the rocket instance
/// the caller decides where the data comes from, so the same routes run on
/// postgres in production and on the in memory repository in tests
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .attach(CORS::new(state.allowed_origins.clone()))
        .manage(state)
        .register("/", catchers![default_catcher])
        .mount(
            "/api",
            routes![
                preflight,
                api::health::health,
                // dashboard
                api::dashboard::get_standings,
                api::dashboard::stream,
                api::dashboard::leg_results,
                api::dashboard::kills,
                api::dashboard::legs,
                api::dashboard::team,
                api::dashboard::search_runners,
                api::dashboard::runner,
                // entry
                api::entry::submit_time,
                api::entry::submit_van,
                // runner & captain
                api::runner::my_legs,
                api::captain::van_legs,
            ],
        )
}
