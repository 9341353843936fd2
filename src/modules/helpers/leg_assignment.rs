use crate::modules::config::RaceConfig;
use crate::modules::models::runner::Runner;

/// # leg assignment
/// maps a runners place in the team (van, run order) to the legs they run and
/// back. nothing here is stored, it is all arithmetic on the race config.
///
/// with the default race van 1 runs legs 1-6, 13-18 and 25-30, van 2 runs
/// 7-12, 19-24 and 31-36.
pub struct LegAssignment {}

impl LegAssignment {
    /// # first leg of a position
    ///
    /// ## Arguments
    /// * `van_number` - the van, starting at 1
    /// * `run_order` - the place in the van, starting at 1
    /// * `config` - the race config
    pub fn base_leg(van_number: i32, run_order: i32, config: &RaceConfig) -> i32 {
        (van_number - 1) * config.runners_per_van + run_order
    }

    /// # legs of a runner
    /// the legs the runner is scheduled for, ascending. one leg per rotation.
    ///
    /// ## Arguments
    /// * `runner` - the runner
    /// * `config` - the race config
    ///
    /// ## Returns
    /// * `Vec<i32>` - the leg numbers, `legs_per_runner` of them
    pub fn legs_for_runner(runner: &Runner, config: &RaceConfig) -> Vec<i32> {
        LegAssignment::legs_for_position(runner.van_number, runner.run_order, config)
    }

    pub fn legs_for_position(van_number: i32, run_order: i32, config: &RaceConfig) -> Vec<i32> {
        let base = LegAssignment::base_leg(van_number, run_order, config);

        (0..config.legs_per_runner())
            .map(|rotation| base + rotation * config.legs_per_van)
            .collect()
    }

    /// # runner of a leg
    /// find the runner of a team that is scheduled for the leg, whether or not
    /// they have run it yet.
    ///
    /// ## Arguments
    /// * `leg_number` - the leg
    /// * `team_runners` - the runners of a single team
    /// * `config` - the race config
    ///
    /// ## Returns
    /// * `Option<&Runner>` - `None` for legs outside the race or an empty slot
    pub fn runner_for_leg<'a>(
        leg_number: i32,
        team_runners: &'a [Runner],
        config: &RaceConfig,
    ) -> Option<&'a Runner> {
        if leg_number <= 0 || leg_number > config.total_legs {
            return None;
        }

        team_runners
            .iter()
            .find(|runner| LegAssignment::is_assigned(runner, leg_number, config))
    }

    pub fn is_assigned(runner: &Runner, leg_number: i32, config: &RaceConfig) -> bool {
        LegAssignment::legs_for_runner(runner, config).contains(&leg_number)
    }

    /// # the legs a van covers
    /// every leg run by any runner in the van, ascending
    pub fn van_legs(van_number: i32, config: &RaceConfig) -> Vec<i32> {
        if van_number <= 0 || van_number > config.van_count() {
            return Vec::new();
        }

        let mut legs: Vec<i32> = (1..=config.runners_per_van)
            .flat_map(|run_order| LegAssignment::legs_for_position(van_number, run_order, config))
            .collect();
        legs.sort_unstable();

        legs
    }

    /// # is the position part of the race
    /// a runner outside of the configured vans or run orders has no legs
    pub fn is_valid_position(van_number: i32, run_order: i32, config: &RaceConfig) -> bool {
        (1..=config.van_count()).contains(&van_number) && (1..=config.runners_per_van).contains(&run_order)
    }
}
