pub struct Math {}

impl Math {
    pub fn round_float_to_n_decimals(number: f64, decimals: i32) -> f64 {
        let multiplier = 10.0_f64.powi(decimals);
        (number * multiplier).round() / multiplier
    }

    /// # mean
    /// `None` for an empty slice instead of NaN
    pub fn mean(nums: &[f64]) -> Option<f64> {
        if nums.is_empty() {
            return None;
        }

        let sum: f64 = nums.iter().sum();
        Some(sum / nums.len() as f64)
    }
}
