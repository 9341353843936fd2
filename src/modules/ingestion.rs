use std::sync::Arc;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, ForbiddenSnafu, InvalidInputSnafu, NotFoundSnafu, UnauthorizedSnafu};
use crate::modules::config::RaceConfig;
use crate::modules::events::{EventBus, RaceEvent};
use crate::modules::helpers::leg_assignment::LegAssignment;
use crate::modules::helpers::pace::PaceHelper;
use crate::modules::helpers::pin::PinHelper;
use crate::modules::models::leg_result::{EnteredBy, LegResult, NewLegResult};
use crate::modules::models::runner::Runner;
use crate::modules::repository::RaceRepository;

pub const CAPTAIN_ROLE: &str = "captain";
pub const RUNNER_ROLE: &str = "runner";

/// what a caller presented, nothing here is checked yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub pin: Option<String>,
    pub role: Option<String>,
    pub admin_key: Option<String>,
}

/// # submitter
/// an authenticated caller. captains carry the van they captain.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitter {
    Runner(Runner),
    Captain { runner: Runner, van_number: i32 },
    Admin,
}

impl Submitter {
    pub fn entered_by(&self) -> EnteredBy {
        match self {
            Submitter::Runner(_) => EnteredBy::Runner,
            Submitter::Captain { .. } => EnteredBy::Captain,
            Submitter::Admin => EnteredBy::Admin,
        }
    }

    pub fn runner(&self) -> Option<&Runner> {
        match self {
            Submitter::Runner(runner) => Some(runner),
            Submitter::Captain { runner, .. } => Some(runner),
            Submitter::Admin => None,
        }
    }
}

/// a clock time as seconds or as `HH:MM:SS` / `MM:SS`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ClockTime {
    Seconds(i64),
    Formatted(String),
}

impl ClockTime {
    pub fn seconds(&self) -> CustomResult<i32> {
        let seconds = match self {
            ClockTime::Seconds(seconds) => i32::try_from(*seconds).ok(),
            ClockTime::Formatted(formatted) => PaceHelper::parse_time_to_seconds(formatted),
        };

        match seconds {
            Some(seconds) if seconds > 0 => Ok(seconds),
            _ => InvalidInputSnafu {
                reason: "clock_time must be a positive amount of seconds",
            }
            .fail(),
        }
    }
}

/// # time submission
/// `runner_id` may be left out by a runner submitting for themselves
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeSubmission {
    #[serde(default)]
    pub runner_id: Option<i32>,
    pub leg_number: i32,
    pub clock_time: ClockTime,
    #[serde(default)]
    pub kills: Option<i32>,
}

/// # ingestion gateway
/// the only way a leg result gets into the store. every accepted result is
/// announced on the event bus, after the write went through.
#[derive(Clone)]
pub struct IngestionGateway {
    repository: Arc<dyn RaceRepository>,
    bus: EventBus,
    config: RaceConfig,
    admin_key: String,
}

impl IngestionGateway {
    pub fn new(
        repository: Arc<dyn RaceRepository>,
        bus: EventBus,
        config: RaceConfig,
        admin_key: &str,
    ) -> IngestionGateway {
        IngestionGateway {
            repository,
            bus,
            config,
            admin_key: admin_key.to_string(),
        }
    }

    /// # authenticate a caller
    /// an admin key wins over a pin. a runner asking for the captain role must
    /// be listed as the captain of their own van.
    ///
    /// ## Arguments
    /// * `credentials` - what the caller presented
    ///
    /// ## Returns
    /// * `Submitter` - the caller, `UnauthorizedError` when nothing valid was presented
    pub fn authenticate(&self, credentials: &Credentials) -> CustomResult<Submitter> {
        if let Some(key) = &credentials.admin_key {
            if !self.admin_key.is_empty() && key == &self.admin_key {
                return Ok(Submitter::Admin);
            }
            warn!(target:"ingestion:authenticate", "rejected invalid admin key");
            return UnauthorizedSnafu.fail();
        }

        let pin = match &credentials.pin {
            Some(pin) => pin.trim(),
            None => return UnauthorizedSnafu.fail(),
        };
        PinHelper::validate_pin(pin)?;

        let runner = match self.repository.find_runner_by_pin(pin)? {
            Some(runner) => runner,
            None => {
                warn!(target:"ingestion:authenticate", "rejected unknown pin");
                return UnauthorizedSnafu.fail();
            }
        };

        match credentials.role.as_deref().map(str::trim) {
            None | Some("") | Some(RUNNER_ROLE) => Ok(Submitter::Runner(runner)),
            Some(CAPTAIN_ROLE) => {
                let team = self.repository.find_team(runner.team_id)?.ok_or_else(|| {
                    NotFoundSnafu {
                        what: format!("team {}", runner.team_id),
                    }
                    .build()
                })?;

                if !team.team.is_captain(runner.id, runner.van_number) {
                    return ForbiddenSnafu {
                        reason: format!("{} is not a van captain", runner.name),
                    }
                    .fail();
                }

                Ok(Submitter::Captain {
                    van_number: runner.van_number,
                    runner,
                })
            }
            Some(other) => InvalidInputSnafu {
                reason: format!("unknown role: {}", other),
            }
            .fail(),
        }
    }

    /// # submit a leg result
    /// validates, stores and announces a result. a rejected submission leaves
    /// the store and the event bus untouched.
    ///
    /// ## Arguments
    /// * `submitter` - the authenticated caller
    /// * `submission` - the result to store
    ///
    /// ## Returns
    /// * `LegResult` - the stored result
    pub fn submit(&self, submitter: &Submitter, submission: &TimeSubmission) -> CustomResult<LegResult> {
        match self.try_submit(submitter, submission) {
            Ok((result, team_id)) => {
                info!(
                    target:"ingestion:submit",
                    "accepted {}s with {} kills for runner {} on leg {} (entered by {})",
                    result.clock_time, result.kills, result.runner_id, result.leg_number, result.entered_by
                );

                let receivers = self.bus.publish(RaceEvent::ResultAccepted {
                    result: result.clone(),
                    team_id,
                });
                if receivers == 0 {
                    warn!(target:"ingestion:submit", "result accepted while nobody is listening for it");
                }

                Ok(result)
            }
            Err(error) => {
                if error.is_client_error() {
                    warn!(target:"ingestion:submit", "rejected submission for leg {}: {}", submission.leg_number, error);
                } else {
                    error!(target:"ingestion:submit", "failed to store submission for leg {}: {}", submission.leg_number, error);
                }
                Err(error)
            }
        }
    }

    fn try_submit(&self, submitter: &Submitter, submission: &TimeSubmission) -> CustomResult<(LegResult, i32)> {
        let runner = self.target_runner(submitter, submission)?;
        IngestionGateway::authorize(submitter, &runner)?;

        let clock_time = submission.clock_time.seconds()?;
        let kills = submission.kills.unwrap_or(0);
        if kills < 0 {
            return InvalidInputSnafu {
                reason: "kills can not be negative",
            }
            .fail();
        }

        if self.repository.find_leg(submission.leg_number)?.is_none() {
            return NotFoundSnafu {
                what: format!("leg {}", submission.leg_number),
            }
            .fail();
        }

        // a position outside the vans shares its legs with another runner
        if !LegAssignment::is_valid_position(runner.van_number, runner.run_order, &self.config) {
            return InvalidInputSnafu {
                reason: format!(
                    "{} has no place in the race (van {}, run order {})",
                    runner.name, runner.van_number, runner.run_order
                ),
            }
            .fail();
        }

        if !LegAssignment::is_assigned(&runner, submission.leg_number, &self.config) {
            return InvalidInputSnafu {
                reason: format!("leg {} is not assigned to {}", submission.leg_number, runner.name),
            }
            .fail();
        }

        let result = self.repository.upsert_result(&NewLegResult {
            leg_number: submission.leg_number,
            runner_id: runner.id,
            clock_time,
            kills,
            entered_by: submitter.entered_by(),
        })?;

        Ok((result, runner.team_id))
    }

    fn target_runner(&self, submitter: &Submitter, submission: &TimeSubmission) -> CustomResult<Runner> {
        if let Submitter::Runner(runner) = submitter {
            return match submission.runner_id {
                Some(id) if id != runner.id => ForbiddenSnafu {
                    reason: "runners can only submit their own times",
                }
                .fail(),
                _ => Ok(runner.clone()),
            };
        }

        let runner_id = match submission.runner_id {
            Some(id) => id,
            None => {
                return InvalidInputSnafu {
                    reason: "runner_id is required",
                }
                .fail()
            }
        };

        self.repository.find_runner(runner_id)?.ok_or_else(|| {
            NotFoundSnafu {
                what: format!("runner {}", runner_id),
            }
            .build()
        })
    }

    /// captains may only submit for their own van
    fn authorize(submitter: &Submitter, runner: &Runner) -> CustomResult<()> {
        match submitter {
            Submitter::Admin => Ok(()),
            Submitter::Runner(own) if own.id == runner.id => Ok(()),
            Submitter::Runner(_) => ForbiddenSnafu {
                reason: "runners can only submit their own times",
            }
            .fail(),
            Submitter::Captain { runner: captain, van_number }
                if captain.team_id == runner.team_id && *van_number == runner.van_number =>
            {
                Ok(())
            }
            Submitter::Captain { .. } => ForbiddenSnafu {
                reason: format!("{} is not in your van", runner.name),
            }
            .fail(),
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::modules::helpers::standings::StandingsHelper;
    use crate::modules::models::leg::Leg;
    use crate::modules::models::team::{City, Team};
    use crate::modules::repository::memory::InMemoryRaceRepository;

    fn runner(id: i32, team_id: i32, van_number: i32, run_order: i32) -> Runner {
        Runner {
            id,
            team_id,
            name: format!("runner {}", id),
            van_number,
            run_order,
            projected_pace: 420.0,
            pin: format!("{}", 100000 + id),
        }
    }

    fn team(id: i32, name: &str, van1: i32, van2: i32) -> Team {
        Team {
            id,
            name: name.to_string(),
            city: City::Dallas,
            color: "#ff0000".to_string(),
            van1_captain_id: Some(van1),
            van2_captain_id: Some(van2),
        }
    }

    fn gateway() -> (IngestionGateway, EventBus) {
        let repository = InMemoryRaceRepository::new()
            .with_team(
                team(1, "RED", 11, 21),
                vec![runner(11, 1, 1, 1), runner(12, 1, 1, 2), runner(21, 1, 2, 1)],
            )
            .with_team(team(2, "GREEN", 31, 41), vec![runner(31, 2, 1, 1)])
            .with_legs((1..=36).map(|n| Leg::bare(n, n, 5.0)).collect());

        let bus = EventBus::default();
        let gateway = IngestionGateway::new(Arc::new(repository), bus.clone(), RaceConfig::default(), "admin-secret");
        (gateway, bus)
    }

    fn pin_of(id: i32) -> Credentials {
        Credentials {
            pin: Some(format!("{}", 100000 + id)),
            ..Credentials::default()
        }
    }

    fn submission(runner_id: Option<i32>, leg_number: i32, seconds: i64) -> TimeSubmission {
        TimeSubmission {
            runner_id,
            leg_number,
            clock_time: ClockTime::Seconds(seconds),
            kills: Some(1),
        }
    }

    #[test]
    fn authenticates_each_role() {
        let (gateway, _) = gateway();

        let admin = Credentials {
            admin_key: Some("admin-secret".to_string()),
            ..Credentials::default()
        };
        assert_eq!(gateway.authenticate(&admin).unwrap(), Submitter::Admin);

        let submitter = gateway.authenticate(&pin_of(12)).unwrap();
        assert_eq!(submitter.entered_by(), EnteredBy::Runner);

        let captain = Credentials {
            role: Some("captain".to_string()),
            ..pin_of(21)
        };
        assert!(matches!(
            gateway.authenticate(&captain).unwrap(),
            Submitter::Captain { van_number: 2, .. }
        ));
    }

    #[test]
    fn bad_credentials_are_rejected() {
        let (gateway, _) = gateway();

        assert!(matches!(gateway.authenticate(&Credentials::default()), Err(Error::UnauthorizedError)));
        assert!(matches!(gateway.authenticate(&pin_of(99)), Err(Error::UnauthorizedError)));

        let wrong_key = Credentials {
            admin_key: Some("guess".to_string()),
            ..Credentials::default()
        };
        assert!(matches!(gateway.authenticate(&wrong_key), Err(Error::UnauthorizedError)));

        let bad_pin = Credentials {
            pin: Some("12ab".to_string()),
            ..Credentials::default()
        };
        assert!(matches!(gateway.authenticate(&bad_pin), Err(Error::InvalidInputError { .. })));

        let not_a_captain = Credentials {
            role: Some("captain".to_string()),
            ..pin_of(12)
        };
        assert!(matches!(gateway.authenticate(&not_a_captain), Err(Error::ForbiddenError { .. })));
    }

    #[test]
    fn runner_submits_own_leg_and_event_follows() {
        let (gateway, bus) = gateway();
        let mut events = bus.subscribe();
        let submitter = gateway.authenticate(&pin_of(11)).unwrap();

        let result = gateway.submit(&submitter, &submission(None, 13, 2400)).unwrap();
        assert_eq!(result.runner_id, 11);
        assert_eq!(result.entered_by, EnteredBy::Runner);

        match events.try_recv().unwrap() {
            RaceEvent::ResultAccepted { result, team_id } => {
                assert_eq!(result.leg_number, 13);
                assert_eq!(team_id, 1);
            }
        }
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn formatted_clock_times_are_accepted() {
        let (gateway, _) = gateway();
        let submitter = gateway.authenticate(&pin_of(11)).unwrap();
        let formatted = TimeSubmission {
            clock_time: ClockTime::Formatted("40:00".to_string()),
            ..submission(None, 1, 0)
        };

        assert_eq!(gateway.submit(&submitter, &formatted).unwrap().clock_time, 2400);
    }

    #[test]
    fn invalid_submissions_publish_nothing() {
        let (gateway, bus) = gateway();
        let mut events = bus.subscribe();
        let submitter = gateway.authenticate(&pin_of(11)).unwrap();

        let zero = submission(None, 1, 0);
        assert!(matches!(gateway.submit(&submitter, &zero), Err(Error::InvalidInputError { .. })));

        let negative_kills = TimeSubmission {
            kills: Some(-1),
            ..submission(None, 1, 2000)
        };
        assert!(matches!(gateway.submit(&submitter, &negative_kills), Err(Error::InvalidInputError { .. })));

        let not_assigned = submission(None, 2, 2000);
        assert!(matches!(gateway.submit(&submitter, &not_assigned), Err(Error::InvalidInputError { .. })));

        let unknown_leg = submission(None, 40, 2000);
        assert!(matches!(gateway.submit(&submitter, &unknown_leg), Err(Error::NotFoundError { .. })));

        let someone_else = submission(Some(12), 2, 2000);
        assert!(matches!(gateway.submit(&submitter, &someone_else), Err(Error::ForbiddenError { .. })));

        assert!(events.try_recv().is_err());
    }

    #[test]
    fn captains_are_limited_to_their_van() {
        let (gateway, _) = gateway();
        let captain = gateway
            .authenticate(&Credentials {
                role: Some("captain".to_string()),
                ..pin_of(11)
            })
            .unwrap();

        let own_van = gateway.submit(&captain, &submission(Some(12), 2, 2100)).unwrap();
        assert_eq!(own_van.entered_by, EnteredBy::Captain);

        let other_van = submission(Some(21), 7, 2100);
        assert!(matches!(gateway.submit(&captain, &other_van), Err(Error::ForbiddenError { .. })));

        let other_team = submission(Some(31), 1, 2100);
        assert!(matches!(gateway.submit(&captain, &other_team), Err(Error::ForbiddenError { .. })));

        let missing_runner = submission(None, 2, 2100);
        assert!(matches!(gateway.submit(&captain, &missing_runner), Err(Error::InvalidInputError { .. })));
    }

    #[test]
    fn runners_outside_the_vans_can_not_take_a_leg() {
        let repository = InMemoryRaceRepository::new()
            .with_team(
                team(1, "RED", 21, 21),
                vec![runner(17, 1, 1, 7), runner(21, 1, 2, 1)],
            )
            .with_legs((1..=36).map(|n| Leg::bare(n, n, 5.0)).collect());
        let repository = Arc::new(repository);
        let bus = EventBus::default();
        let mut events = bus.subscribe();
        let gateway = IngestionGateway::new(repository.clone(), bus, RaceConfig::default(), "admin-secret");

        // van 1 order 7 would run legs 7, 19 and 31, the legs of van 2 order 1
        let misplaced = gateway.authenticate(&pin_of(17)).unwrap();
        assert!(matches!(
            gateway.submit(&misplaced, &submission(None, 7, 2000)),
            Err(Error::InvalidInputError { .. })
        ));
        assert!(matches!(
            gateway.submit(&Submitter::Admin, &submission(Some(17), 7, 2000)),
            Err(Error::InvalidInputError { .. })
        ));
        assert!(events.try_recv().is_err());

        let placed = gateway.authenticate(&pin_of(21)).unwrap();
        gateway.submit(&placed, &submission(None, 7, 2000)).unwrap();

        let snapshot = repository.snapshot().unwrap();
        assert_eq!(snapshot.result_count(), 1);
        let standings = StandingsHelper::from_snapshot(&snapshot, &RaceConfig::default());
        assert_eq!(standings[0].completed_leg_count, 1);
        assert_eq!(standings[0].current_leg_number, 2);
    }

    #[test]
    fn admin_corrections_overwrite() {
        let (gateway, _) = gateway();
        let runner = gateway.authenticate(&pin_of(31)).unwrap();
        gateway.submit(&runner, &submission(None, 1, 2400)).unwrap();

        let corrected = gateway.submit(&Submitter::Admin, &submission(Some(31), 1, 2350)).unwrap();
        assert_eq!(corrected.clock_time, 2350);
        assert_eq!(corrected.entered_by, EnteredBy::Admin);

        let unknown = submission(Some(999), 1, 2000);
        assert!(matches!(gateway.submit(&Submitter::Admin, &unknown), Err(Error::NotFoundError { .. })));
    }
}
