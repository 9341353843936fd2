use crate::modules::helpers::math::Math;

/// shown wherever a pace can not be computed
pub const NO_PACE: &str = "--:--";

pub struct PaceHelper {}

impl PaceHelper {
    /// # pace of a result
    ///
    /// ## Arguments
    /// * `clock_time` - seconds the leg took
    /// * `distance` - length of the leg in miles
    ///
    /// ## Returns
    /// * `Option<f64>` - seconds per mile rounded to two decimals, `None` when
    ///   either input is not positive
    pub fn pace_from_result(clock_time: i32, distance: f64) -> Option<f64> {
        if clock_time <= 0 || !(distance > 0.0) {
            return None;
        }

        Some(Math::round_float_to_n_decimals(f64::from(clock_time) / distance, 2))
    }

    /// # format a pace
    /// `M:SS/mi`, or `--:--` for a pace that is missing, NaN or not positive
    pub fn format_pace(seconds_per_mile: f64) -> String {
        if !seconds_per_mile.is_finite() || seconds_per_mile <= 0.0 {
            return NO_PACE.to_string();
        }

        let minutes = (seconds_per_mile / 60.0).floor() as i64;
        let seconds = (seconds_per_mile % 60.0).floor() as i64;

        format!("{}:{:02}/mi", minutes, seconds)
    }

    /// # format a duration
    /// `HH:MM:SS` once an hour has passed, `MM:SS` before that
    pub fn format_time(total_seconds: i64) -> String {
        if total_seconds <= 0 {
            return "00:00:00".to_string();
        }

        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{:02}:{:02}", minutes, seconds)
        }
    }

    /// # format a gap to the leader
    /// positive is behind, negative ahead
    pub fn format_pace_diff(diff_seconds: i64) -> String {
        if diff_seconds == 0 {
            return "On pace".to_string();
        }

        let formatted = PaceHelper::format_time(diff_seconds.abs());
        if diff_seconds < 0 {
            format!("{} ahead", formatted)
        } else {
            format!("{} behind", formatted)
        }
    }

    /// # parse a clock time
    /// accepts `HH:MM:SS` and `MM:SS`
    pub fn parse_time_to_seconds(time: &str) -> Option<i32> {
        let parts = time
            .trim()
            .split(':')
            .map(|part| part.parse::<u32>().ok().map(u64::from))
            .collect::<Option<Vec<u64>>>()?;

        let total = match parts.as_slice() {
            [hours, minutes, seconds] => hours * 3600 + minutes * 60 + seconds,
            [minutes, seconds] => minutes * 60 + seconds,
            _ => return None,
        };

        i32::try_from(total).ok()
    }
}
