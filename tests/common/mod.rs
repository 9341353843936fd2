#![allow(dead_code)]

use std::collections::HashMap;

use chrono::NaiveDateTime;

use relay_race_standings::modules::config::RaceConfig;
use relay_race_standings::modules::helpers::leg_assignment::LegAssignment;
use relay_race_standings::modules::models::leg::Leg;
use relay_race_standings::modules::models::leg_result::{EnteredBy, LegResult};
use relay_race_standings::modules::models::runner::Runner;
use relay_race_standings::modules::models::team::{City, Team, TeamRoster};
use relay_race_standings::modules::repository::memory::InMemoryRaceRepository;

pub const TEAM_NAMES: [&str; 6] = ["BLACK", "BLUE", "GREY", "WHITE", "RED", "GREEN"];

pub fn pin_for(runner_id: i32) -> String {
    format!("{}", 100000 + runner_id)
}

/// a full team, runner ids are `team * 100 + van * 10 + order`
pub fn roster(team_id: i32, name: &str, config: &RaceConfig) -> TeamRoster {
    let mut runners = Vec::new();
    for van in 1..=config.van_count() {
        for order in 1..=config.runners_per_van {
            let id = team_id * 100 + van * 10 + order;
            runners.push(Runner {
                id,
                team_id,
                name: format!("{} Van{} Runner{}", name, van, order),
                van_number: van,
                run_order: order,
                projected_pace: 420.0,
                pin: pin_for(id),
            });
        }
    }

    TeamRoster {
        team: Team {
            id: team_id,
            name: name.to_string(),
            city: if team_id <= 4 { City::Houston } else { City::Dallas },
            color: "#3b82f6".to_string(),
            van1_captain_id: Some(team_id * 100 + 11),
            van2_captain_id: Some(team_id * 100 + 21),
        },
        runners,
    }
}

pub fn six_teams(config: &RaceConfig) -> Vec<TeamRoster> {
    TEAM_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| roster(index as i32 + 1, name, config))
        .collect()
}

pub fn legs(config: &RaceConfig) -> Vec<Leg> {
    (1..=config.total_legs).map(|n| Leg::bare(n, n, 5.0)).collect()
}

pub fn result(leg_number: i32, runner_id: i32, clock_time: i32, kills: i32) -> LegResult {
    LegResult {
        id: runner_id * 100 + leg_number,
        leg_number,
        runner_id,
        clock_time,
        kills,
        entered_by: EnteredBy::Import,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

/// results for the first `times.len()` legs of a team
pub fn run_legs(
    roster: &TeamRoster,
    times: &[i32],
    config: &RaceConfig,
    results: &mut HashMap<i32, Vec<LegResult>>,
) {
    for (index, time) in times.iter().enumerate() {
        let leg = index as i32 + 1;
        if let Some(runner) = LegAssignment::runner_for_leg(leg, &roster.runners, config) {
            results.entry(runner.id).or_default().push(result(leg, runner.id, *time, 0));
        }
    }
}

pub fn repository(config: &RaceConfig) -> InMemoryRaceRepository {
    six_teams(config)
        .into_iter()
        .fold(InMemoryRaceRepository::new(), |repo, roster| {
            repo.with_team(roster.team, roster.runners)
        })
        .with_legs(legs(config))
}
