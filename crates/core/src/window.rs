//! Lookback window resolution.
//!
//! A window is the number of seconds of history a query considers "active".
//! Missing or non-numeric input silently falls back to the default rather
//! than erroring; the clamp bounds are inclusive.

/// Default lookback: one day.
pub const DEFAULT_WINDOW_SECS: i64 = 86_400;

/// Smallest accepted lookback.
pub const MIN_WINDOW_SECS: i64 = 1;

/// Largest accepted lookback: thirty days.
pub const MAX_WINDOW_SECS: i64 = 2_592_000;

/// Resolve the raw `window` query parameter into a usable lookback.
pub fn resolve_window(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_WINDOW_SECS)
        .clamp(MIN_WINDOW_SECS, MAX_WINDOW_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_falls_back_to_default() {
        assert_eq!(resolve_window(None), DEFAULT_WINDOW_SECS);
    }

    #[test]
    fn non_numeric_falls_back_to_default() {
        assert_eq!(resolve_window(Some("soon")), DEFAULT_WINDOW_SECS);
        assert_eq!(resolve_window(Some("")), DEFAULT_WINDOW_SECS);
        assert_eq!(resolve_window(Some("12.5")), DEFAULT_WINDOW_SECS);
    }

    #[test]
    fn numeric_passes_through() {
        assert_eq!(resolve_window(Some("500")), 500);
        assert_eq!(resolve_window(Some(" 3600 ")), 3600);
    }

    #[test]
    fn clamps_inclusive_at_both_ends() {
        assert_eq!(resolve_window(Some("0")), MIN_WINDOW_SECS);
        assert_eq!(resolve_window(Some("-20")), MIN_WINDOW_SECS);
        assert_eq!(resolve_window(Some("1")), 1);
        assert_eq!(resolve_window(Some("2592000")), MAX_WINDOW_SECS);
        assert_eq!(resolve_window(Some("9999999999")), MAX_WINDOW_SECS);
    }
}
