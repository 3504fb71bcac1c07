use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum address length after trimming.
pub const MIN_ADDRESS_LEN: usize = 5;

// Hour component tolerates values up to 29: this is best-effort capture of
// a time-of-day token inside free text, not strict 24h validation. Minutes
// are strict.
static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:today|tomorrow)?\s*[0-2]?\d:[0-5]\d").expect("time pattern compiles")
});

pub fn normalize_address(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (trimmed.chars().count() >= MIN_ADDRESS_LEN).then(|| trimmed.to_owned())
}

/// Accepts text containing an optional `today`/`tomorrow` qualifier and an
/// `H:MM`/`HH:MM` token. The whole trimmed input is kept as the delivery
/// time, matching what couriers see.
pub fn normalize_delivery_time(input: &str) -> Option<String> {
    let trimmed = input.trim();
    TIME_PATTERN.is_match(trimmed).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::{normalize_address, normalize_delivery_time};

    #[test]
    fn short_addresses_are_rejected() {
        assert_eq!(normalize_address("ab"), None);
        assert_eq!(normalize_address("  ab  "), None);
    }

    #[test]
    fn full_addresses_are_trimmed_and_accepted() {
        assert_eq!(normalize_address("  123 Main Street "), Some("123 Main Street".to_owned()));
    }

    #[test]
    fn plain_times_are_accepted() {
        assert_eq!(normalize_delivery_time("18:30"), Some("18:30".to_owned()));
    }

    #[test]
    fn relative_day_qualifiers_are_accepted() {
        assert_eq!(normalize_delivery_time("tomorrow 9:05"), Some("tomorrow 9:05".to_owned()));
        assert_eq!(normalize_delivery_time("Today 18:30"), Some("Today 18:30".to_owned()));
    }

    #[test]
    fn out_of_range_minutes_are_rejected() {
        assert_eq!(normalize_delivery_time("25:99"), None);
    }

    #[test]
    fn tolerant_hour_range_extends_past_midnight_values() {
        assert!(normalize_delivery_time("29:59").is_some());
        assert!(normalize_delivery_time("9:99").is_none());
    }

    #[test]
    fn non_time_text_is_rejected() {
        assert_eq!(normalize_delivery_time("banana"), None);
    }
}
