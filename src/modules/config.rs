use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, InvalidConfigSnafu, MissingEnvSnafu};

pub const DEFAULT_TOTAL_LEGS: i32 = 36;
pub const DEFAULT_RUNNERS_PER_VAN: i32 = 6;
pub const DEFAULT_LEGS_PER_VAN: i32 = 12;
/// a team stores one captain per van, for two vans
pub const MAX_VANS: i32 = 2;

/// # race constants
/// the shape of the relay. every leg number computation goes through this
/// struct so a race with a different van count or van size is a config change.
///
/// `legs_per_van` is the rotation length: the distance between two legs run
/// by the same runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceConfig {
    pub total_legs: i32,
    pub runners_per_van: i32,
    pub legs_per_van: i32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        RaceConfig {
            total_legs: DEFAULT_TOTAL_LEGS,
            runners_per_van: DEFAULT_RUNNERS_PER_VAN,
            legs_per_van: DEFAULT_LEGS_PER_VAN,
        }
    }
}

impl RaceConfig {
    /// # create a validated race config
    ///
    /// ## Arguments
    /// * `total_legs` - the amount of legs in the race
    /// * `runners_per_van` - the amount of runners in a single van
    /// * `legs_per_van` - the rotation length
    ///
    /// ## Returns
    /// * `RaceConfig` - the config, or `InvalidConfigError` when the numbers do not describe a relay
    pub fn new(total_legs: i32, runners_per_van: i32, legs_per_van: i32) -> CustomResult<RaceConfig> {
        let config = RaceConfig {
            total_legs,
            runners_per_van,
            legs_per_van,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> CustomResult<()> {
        if self.total_legs <= 0 || self.runners_per_van <= 0 || self.legs_per_van <= 0 {
            return InvalidConfigSnafu {
                reason: format!(
                    "total_legs ({}), runners_per_van ({}) and legs_per_van ({}) must be positive",
                    self.total_legs, self.runners_per_van, self.legs_per_van
                ),
            }
            .fail();
        }

        if self.legs_per_van % self.runners_per_van != 0 {
            return InvalidConfigSnafu {
                reason: format!(
                    "legs_per_van ({}) must be a multiple of runners_per_van ({})",
                    self.legs_per_van, self.runners_per_van
                ),
            }
            .fail();
        }

        if self.van_count() > MAX_VANS {
            return InvalidConfigSnafu {
                reason: format!(
                    "legs_per_van ({}) and runners_per_van ({}) give {} vans, at most {} are supported",
                    self.legs_per_van,
                    self.runners_per_van,
                    self.van_count(),
                    MAX_VANS
                ),
            }
            .fail();
        }

        if self.total_legs % self.legs_per_van != 0 {
            return InvalidConfigSnafu {
                reason: format!(
                    "total_legs ({}) must be a multiple of legs_per_van ({})",
                    self.total_legs, self.legs_per_van
                ),
            }
            .fail();
        }

        Ok(())
    }

    pub fn van_count(&self) -> i32 {
        self.legs_per_van / self.runners_per_van
    }

    pub fn legs_per_runner(&self) -> i32 {
        self.total_legs / self.legs_per_van
    }

    pub fn runners_per_team(&self) -> i32 {
        self.legs_per_van
    }
}

/// # application config
/// everything the server needs at startup. loaded from the environment
/// (and a `.env` file when present).
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub race: RaceConfig,
    pub database_url: String,
    pub admin_key: String,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> CustomResult<AppConfig> {
        dotenv().ok();
        AppConfig::from_lookup(|name| env::var(name).ok())
    }

    /// # load the config from a lookup function
    /// numeric values that can not be parsed are an error, they are never
    /// replaced by the default.
    ///
    /// ## Arguments
    /// * `lookup` - returns the value of a variable, or `None` when unset
    pub fn from_lookup<F>(lookup: F) -> CustomResult<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let race = RaceConfig::new(
            parse_or(&lookup, "RACE_TOTAL_LEGS", DEFAULT_TOTAL_LEGS)?,
            parse_or(&lookup, "RACE_RUNNERS_PER_VAN", DEFAULT_RUNNERS_PER_VAN)?,
            parse_or(&lookup, "RACE_LEGS_PER_VAN", DEFAULT_LEGS_PER_VAN)?,
        )?;

        let database_url = required(&lookup, "DATABASE_URL")?;
        let admin_key = required(&lookup, "ADMIN_KEY")?;
        let frontend_url = lookup("FRONTEND_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        Ok(AppConfig {
            race,
            database_url,
            admin_key,
            frontend_url,
        })
    }

    /// # allowed cors origins
    /// the frontend url and its `www.` variant
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![self.frontend_url.clone()];
        let www = self.frontend_url.replacen("https://", "https://www.", 1);
        if www != self.frontend_url {
            origins.push(www);
        }

        origins
    }
}

fn required<F>(lookup: &F, name: &str) -> CustomResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => MissingEnvSnafu { name }.fail(),
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> CustomResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            InvalidConfigSnafu {
                reason: format!("{} is not a valid number: {:?}", name, raw),
            }
            .build()
        }),
    }
}
