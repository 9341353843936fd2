use std::env;
use dotenvy::dotenv;
use fern::Dispatch;

pub const DEFAULT_LOG_FILE: &str = "program.log";

/// # level from the environment value
/// anything that is not a known level falls back to info
pub fn level_from_str(verbosity: &str) -> log::LevelFilter {
    match verbosity.trim().to_uppercase().as_str() {
        "OFF" => log::LevelFilter::Off,
        "ERROR" => log::LevelFilter::Error,
        "WARN" => log::LevelFilter::Warn,
        "DEBUG" => log::LevelFilter::Debug,
        "TRACE" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}

/// # setup logging
/// log to stdout and to `LOG_FILE` with the level from `LOGGING_LEVEL`.
/// rocket's own chatter is capped at warn.
pub fn setup_logging() -> Result<(), fern::InitError> {
    dotenv().ok();
    let verbosity = env::var("LOGGING_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

    let base_config = Dispatch::new()
        .level(level_from_str(&verbosity))
        .level_for("rocket", log::LevelFilter::Warn)
        .level_for("_", log::LevelFilter::Warn)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        });

    base_config
        .chain(std::io::stdout())
        .chain(fern::log_file(log_file)?)
        .apply()?;

    Ok(())
}
