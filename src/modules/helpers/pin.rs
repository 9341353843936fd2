use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

use crate::errors::{CustomResult, InvalidInputSnafu};

const PIN_PATTERN: &str = r"^\d{4,6}$";

pub struct PinHelper {}

impl PinHelper {
    /// # generate a pin
    /// a random 6 digit pin, never starting with a zero
    pub fn generate_pin() -> String {
        rand::thread_rng().gen_range(100_000..1_000_000).to_string()
    }

    /// # generate a pin not in use yet
    ///
    /// ## Arguments
    /// * `in_use` - returns if a pin is already taken
    /// * `max_attempts` - the amount of pins to try before giving up
    ///
    /// ## Returns
    /// * `Option<String>` - a free pin, `None` when every attempt was taken
    pub fn generate_unique_pin<F>(mut in_use: F, max_attempts: usize) -> Option<String>
    where
        F: FnMut(&str) -> bool,
    {
        (0..max_attempts)
            .map(|_| PinHelper::generate_pin())
            .find(|pin| !in_use(pin))
    }

    pub fn is_valid_pin(pin: &str) -> bool {
        static PIN_REGEX: OnceLock<Regex> = OnceLock::new();

        PIN_REGEX
            .get_or_init(|| Regex::new(PIN_PATTERN).expect("pin pattern compiles"))
            .is_match(pin)
    }

    /// # validate a pin
    /// pins are 4 to 6 digits
    pub fn validate_pin(pin: &str) -> CustomResult<()> {
        if PinHelper::is_valid_pin(pin) {
            Ok(())
        } else {
            InvalidInputSnafu {
                reason: "pin must be 4 to 6 digits",
            }
            .fail()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_pins_are_six_digits() {
        for _ in 0..200 {
            let pin = PinHelper::generate_pin();
            assert_eq!(pin.len(), 6);
            assert!(PinHelper::is_valid_pin(&pin));
        }
    }

    #[test]
    fn pin_format() {
        assert!(PinHelper::is_valid_pin("1234"));
        assert!(PinHelper::is_valid_pin("123456"));
        assert!(!PinHelper::is_valid_pin("123"));
        assert!(!PinHelper::is_valid_pin("1234567"));
        assert!(!PinHelper::is_valid_pin("12a4"));
        assert!(!PinHelper::is_valid_pin(" 1234"));
        assert!(PinHelper::validate_pin("abcd").is_err());
    }

    #[test]
    fn unique_pin_skips_taken_pins() {
        let mut taken = HashSet::new();
        for _ in 0..50 {
            let pin = PinHelper::generate_unique_pin(|p| taken.contains(p), 100).unwrap();
            assert!(taken.insert(pin));
        }

        assert_eq!(PinHelper::generate_unique_pin(|_| true, 10), None);
    }
}
