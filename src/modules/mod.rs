pub mod config;
pub mod events;
pub mod ingestion;
pub mod repository;

pub mod models {
    pub mod team;
    pub mod runner;
    pub mod leg;
    pub mod leg_result;

    pub mod general;
}

pub mod helpers {
    pub mod leg_assignment;
    pub mod standings;
    pub mod leaderboard;
    pub mod pace;
    pub mod pin;

    pub mod math;
    pub mod logging;

    pub mod fairings {
        pub mod cors;
    }
}
