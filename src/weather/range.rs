use chrono::{DateTime, Duration, Utc};

/// Symbolic time range for history, stats and export queries. The window is
/// always `[now - range, now]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    Hours1,
    Hours6,
    Hours24,
    Days7,
    Days30,
}

impl Range {
    /// Resolve a range token. Unknown or missing tokens default to 24h so a
    /// bad query parameter never fails a request.
    pub fn parse(token: Option<&str>) -> Self {
        match token {
            Some("1h") => Range::Hours1,
            Some("6h") => Range::Hours6,
            Some("24h") => Range::Hours24,
            Some("7d") => Range::Days7,
            Some("30d") => Range::Days30,
            _ => Range::Hours24,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Range::Hours1 => "1h",
            Range::Hours6 => "6h",
            Range::Hours24 => "24h",
            Range::Days7 => "7d",
            Range::Days30 => "30d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Range::Hours1 => Duration::hours(1),
            Range::Hours6 => Duration::hours(6),
            Range::Hours24 => Duration::hours(24),
            Range::Days7 => Duration::days(7),
            Range::Days30 => Duration::days(30),
        }
    }

    /// Absolute start of the window ending at `now`.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tokens() {
        assert_eq!(Range::parse(Some("1h")), Range::Hours1);
        assert_eq!(Range::parse(Some("6h")), Range::Hours6);
        assert_eq!(Range::parse(Some("24h")), Range::Hours24);
        assert_eq!(Range::parse(Some("7d")), Range::Days7);
        assert_eq!(Range::parse(Some("30d")), Range::Days30);
    }

    #[test]
    fn unknown_or_missing_defaults_to_24h() {
        assert_eq!(Range::parse(None), Range::Hours24);
        assert_eq!(Range::parse(Some("")), Range::Hours24);
        assert_eq!(Range::parse(Some("48h")), Range::Hours24);
        assert_eq!(Range::parse(Some("1H")), Range::Hours24);
    }

    #[test]
    fn window_start_is_now_minus_duration() {
        let now = Utc::now();
        assert_eq!(Range::Hours6.start(now), now - Duration::hours(6));
        assert_eq!(Range::Days30.start(now), now - Duration::days(30));
    }
}
