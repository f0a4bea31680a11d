//! Wall-clock helpers.
//!
//! Decision code takes explicit `now_ms` parameters so the timestamp
//! state machines (adversity windows, throttle delays) stay testable;
//! this is the single place real time enters the system.

use chrono::Utc;

/// Current Unix time in milliseconds.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_recent() {
        // 2024-01-01T00:00:00Z in ms; anything earlier means a broken clock.
        assert!(now_ms() > 1_704_067_200_000);
    }
}
