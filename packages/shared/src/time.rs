//! Time-related utilities with clock abstraction for testability.

use chrono::Utc;

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp in milliseconds
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_unix_timestamp()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp in milliseconds (UTC)
pub fn get_unix_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a Unix timestamp (milliseconds) to RFC 3339 format
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    let seconds = timestamp_millis / 1000;
    let nanos = ((timestamp_millis % 1000) * 1_000_000) as u32;
    match chrono::DateTime::from_timestamp(seconds, nanos) {
        Some(dt) => dt.to_rfc3339(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_non_zero_timestamp() {
        let clock = SystemClock;

        let timestamp = clock.now_millis();

        assert!(timestamp > 0);
    }

    #[test]
    fn test_system_clock_returns_increasing_timestamps() {
        let clock = SystemClock;

        let timestamp1 = clock.now_millis();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let timestamp2 = clock.now_millis();

        assert!(timestamp2 >= timestamp1);
    }

    #[test]
    fn test_fixed_clock_returns_fixed_timestamp() {
        let fixed_time = 1234567890123;
        let clock = FixedClock::new(fixed_time);

        assert_eq!(clock.now_millis(), fixed_time);
    }

    #[test]
    fn test_fixed_clock_is_consistent_across_calls() {
        let fixed_time = 9876543210987;
        let clock = FixedClock::new(fixed_time);

        assert_eq!(clock.now_millis(), fixed_time);
        assert_eq!(clock.now_millis(), fixed_time);
    }

    #[test]
    fn test_timestamp_to_rfc3339_formats_epoch() {
        let formatted = timestamp_to_rfc3339(0);

        assert_eq!(formatted, "1970-01-01T00:00:00+00:00");
    }
}
