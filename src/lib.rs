pub mod app;
pub mod errors;
pub mod schema;
pub mod modules;

pub mod macros {
    pub mod error_handler;
}

pub mod routes {
    pub mod guards;

    pub mod api {
        pub mod captain;
        pub mod dashboard;
        pub mod entry;
        pub mod health;
        pub mod runner;
    }
}
