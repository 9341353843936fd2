use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::errors::CustomResult;
use crate::modules::config::RaceConfig;
use crate::modules::helpers::standings::{StandingsHelper, StandingsSnapshot};
use crate::modules::models::leg_result::LegResult;
use crate::modules::repository::RaceRepository;

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum RaceEvent {
    /// a result was written to the store
    ResultAccepted { result: LegResult, team_id: i32 },
}

/// # event bus
/// fan out of race events to every subscriber. cloning the bus shares the
/// channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RaceEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> EventBus {
        let (sender, _) = broadcast::channel(capacity);
        EventBus { sender }
    }

    /// # publish an event
    ///
    /// ## Returns
    /// * `usize` - the amount of subscribers that will see the event
    pub fn publish(&self, event: RaceEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(target:"events:publish", "no subscribers for race event");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RaceEvent> {
        self.sender.subscribe()
    }
}

/// # standings broadcaster
/// recomputes the standings from a fresh snapshot for every accepted result
/// and publishes the full list. observers only ever see the latest list, one
/// that was skipped is covered by the next.
pub struct StandingsBroadcaster {
    repository: Arc<dyn RaceRepository>,
    config: RaceConfig,
    sender: watch::Sender<StandingsSnapshot>,
}

impl StandingsBroadcaster {
    pub fn new(
        repository: Arc<dyn RaceRepository>,
        config: RaceConfig,
    ) -> (StandingsBroadcaster, watch::Receiver<StandingsSnapshot>) {
        let (sender, receiver) = watch::channel(StandingsSnapshot::empty());

        (
            StandingsBroadcaster {
                repository,
                config,
                sender,
            },
            receiver,
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<StandingsSnapshot> {
        self.sender.subscribe()
    }

    /// # compute the standings
    /// reads a snapshot and ranks it, blocking on the repository
    pub fn compute(repository: &dyn RaceRepository, config: &RaceConfig) -> CustomResult<StandingsSnapshot> {
        let snapshot = repository.snapshot()?;
        let standings = StandingsHelper::from_snapshot(&snapshot, config);
        debug!(target:"events:compute", "recomputed standings for {} teams", standings.len());

        Ok(StandingsSnapshot::new(standings))
    }

    /// # recompute and publish
    /// a failed read keeps the last published standings in place
    pub async fn refresh(&self) {
        let repository = Arc::clone(&self.repository);
        let config = self.config;

        match tokio::task::spawn_blocking(move || StandingsBroadcaster::compute(repository.as_ref(), &config)).await {
            Ok(Ok(snapshot)) => {
                self.sender.send_replace(snapshot);
            }
            Ok(Err(e)) => {
                error!(target:"events:refresh", "Error recomputing standings: {}", e);
            }
            Err(e) => {
                error!(target:"events:refresh", "standings task failed: {}", e);
            }
        }
    }

    /// # run the broadcaster
    /// publishes the current standings once, then once per event until the
    /// bus is closed
    pub async fn run(self, mut events: broadcast::Receiver<RaceEvent>) {
        self.refresh().await;

        loop {
            match events.recv().await {
                Ok(RaceEvent::ResultAccepted { .. }) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target:"events:broadcaster", "missed {} race events, recomputing from the store", skipped);
                }
                Err(RecvError::Closed) => break,
            }

            self.refresh().await;
        }

        info!(target:"events:broadcaster", "event bus closed, stopping standings broadcaster");
    }

    pub fn spawn(self, events: broadcast::Receiver<RaceEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}

/// # audit log
/// writes every accepted result to the log
pub struct AuditLog {}

impl AuditLog {
    pub fn describe(event: &RaceEvent) -> String {
        match event {
            RaceEvent::ResultAccepted { result, team_id } => format!(
                "team {} runner {} leg {}: {}s, {} kills, entered by {}",
                team_id, result.runner_id, result.leg_number, result.clock_time, result.kills, result.entered_by
            ),
        }
    }

    pub async fn run(mut events: broadcast::Receiver<RaceEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => info!(target:"events:audit", "{}", AuditLog::describe(&event)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target:"events:audit", "audit log missed {} race events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    pub fn spawn(events: broadcast::Receiver<RaceEvent>) -> JoinHandle<()> {
        tokio::spawn(AuditLog::run(events))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDateTime;

    use super::*;
    use crate::modules::models::leg_result::{EnteredBy, NewLegResult};
    use crate::modules::models::runner::Runner;
    use crate::modules::models::team::{City, Team};
    use crate::modules::repository::memory::InMemoryRaceRepository;

    fn repository() -> Arc<InMemoryRaceRepository> {
        let team = Team {
            id: 1,
            name: "BLUE".to_string(),
            city: City::Houston,
            color: "#0000ff".to_string(),
            van1_captain_id: None,
            van2_captain_id: None,
        };
        let runner = Runner {
            id: 7,
            team_id: 1,
            name: "Sam".to_string(),
            van_number: 1,
            run_order: 1,
            projected_pace: 420.0,
            pin: "123456".to_string(),
        };

        Arc::new(InMemoryRaceRepository::new().with_team(team, vec![runner]))
    }

    fn accepted(result: LegResult) -> RaceEvent {
        RaceEvent::ResultAccepted { result, team_id: 1 }
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new(4);
        let result = LegResult {
            id: 1,
            leg_number: 1,
            runner_id: 7,
            clock_time: 2400,
            kills: 0,
            entered_by: EnteredBy::Import,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        };

        assert_eq!(bus.publish(accepted(result.clone())), 0);
        let _receiver = bus.subscribe();
        assert_eq!(bus.publish(accepted(result.clone())), 1);
        assert_eq!(
            AuditLog::describe(&accepted(result)),
            "team 1 runner 7 leg 1: 2400s, 0 kills, entered by import"
        );
    }

    #[tokio::test]
    async fn broadcaster_publishes_after_each_event() {
        let repo = repository();
        let bus = EventBus::default();
        let (broadcaster, mut standings) = StandingsBroadcaster::new(repo.clone(), RaceConfig::default());
        let handle = broadcaster.spawn(bus.subscribe());

        tokio::time::timeout(Duration::from_secs(5), standings.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(standings.borrow_and_update().standings[0].completed_leg_count, 0);

        let result = repo
            .upsert_result(&NewLegResult {
                leg_number: 1,
                runner_id: 7,
                clock_time: 2400,
                kills: 3,
                entered_by: EnteredBy::Runner,
            })
            .unwrap();
        bus.publish(accepted(result));

        tokio::time::timeout(Duration::from_secs(5), standings.changed())
            .await
            .unwrap()
            .unwrap();
        {
            let latest = standings.borrow_and_update();
            assert_eq!(latest.standings[0].completed_leg_count, 1);
            assert_eq!(latest.standings[0].total_kills, 3);
        }

        drop(bus);
        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn lagged_broadcaster_still_reaches_the_latest_state() {
        let repo = repository();
        let bus = EventBus::new(1);
        let (broadcaster, mut standings) = StandingsBroadcaster::new(repo.clone(), RaceConfig::default());
        let events = bus.subscribe();

        for (leg, seconds) in [(1, 2400), (13, 2500), (25, 2600)] {
            let result = repo
                .upsert_result(&NewLegResult {
                    leg_number: leg,
                    runner_id: 7,
                    clock_time: seconds,
                    kills: 0,
                    entered_by: EnteredBy::Runner,
                })
                .unwrap();
            bus.publish(accepted(result));
        }
        drop(bus);

        broadcaster.run(events).await;

        let latest = standings.borrow_and_update();
        assert_eq!(latest.standings[0].completed_leg_count, 3);
        assert_eq!(latest.standings[0].total_elapsed_time, 7500);
    }
}
