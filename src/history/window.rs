//! Lookback windows
//!
//! Symbolic tokens such as `one_month` select how far back a history query
//! reaches. Tokens are matched case-insensitively; anything unrecognized,
//! including an absent token, falls back to [`WindowToken::OneWeek`].
//!
//! Day windows subtract a fixed number of days. Month windows use calendar
//! arithmetic: the same day of month N months earlier, clamped to the last
//! day when that month is shorter (Mar 31 minus one month is Feb 28/29).

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A symbolic lookback period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowToken {
    #[default]
    OneWeek,
    ThreeWeeks,
    OneMonth,
    TwoMonths,
    ThreeMonths,
    FourMonths,
    FiveMonths,
    SixMonths,
}

/// How a window is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Days(i64),
    Months(u32),
}

impl WindowToken {
    /// Get all tokens for iteration
    pub fn all() -> &'static [WindowToken] {
        &[
            WindowToken::OneWeek,
            WindowToken::ThreeWeeks,
            WindowToken::OneMonth,
            WindowToken::TwoMonths,
            WindowToken::ThreeMonths,
            WindowToken::FourMonths,
            WindowToken::FiveMonths,
            WindowToken::SixMonths,
        ]
    }

    /// Parse a token, falling back to `OneWeek` for anything unrecognized
    pub fn parse(token: &str) -> Self {
        Self::recognize(token).unwrap_or_default()
    }

    fn recognize(token: &str) -> Option<Self> {
        let token = token.to_lowercase();
        Self::all().iter().copied().find(|t| t.as_str() == token)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowToken::OneWeek => "one_week",
            WindowToken::ThreeWeeks => "three_weeks",
            WindowToken::OneMonth => "one_month",
            WindowToken::TwoMonths => "two_months",
            WindowToken::ThreeMonths => "three_months",
            WindowToken::FourMonths => "four_months",
            WindowToken::FiveMonths => "five_months",
            WindowToken::SixMonths => "six_months",
        }
    }

    pub fn lookback(&self) -> Lookback {
        match self {
            WindowToken::OneWeek => Lookback::Days(7),
            WindowToken::ThreeWeeks => Lookback::Days(21),
            WindowToken::OneMonth => Lookback::Months(1),
            WindowToken::TwoMonths => Lookback::Months(2),
            WindowToken::ThreeMonths => Lookback::Months(3),
            WindowToken::FourMonths => Lookback::Months(4),
            WindowToken::FiveMonths => Lookback::Months(5),
            WindowToken::SixMonths => Lookback::Months(6),
        }
    }

    /// Start of this window when looking back from `now`
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.lookback() {
            Lookback::Days(days) => now - Duration::days(days),
            // Only fails near the minimum representable date
            Lookback::Months(months) => now
                .checked_sub_months(Months::new(months))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

impl fmt::Display for WindowToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a window token against `now` into an absolute start instant
pub fn resolve(token: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    WindowToken::parse(token).start_from(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 15, 45, 30).unwrap()
    }

    #[test]
    fn test_day_windows() {
        let now = at(2024, 6, 15);

        assert_eq!(resolve("one_week", now), now - Duration::days(7));
        assert_eq!(resolve("three_weeks", now), now - Duration::days(21));
    }

    #[test]
    fn test_month_windows() {
        let now = at(2024, 8, 15);

        assert_eq!(resolve("one_month", now), at(2024, 7, 15));
        assert_eq!(resolve("two_months", now), at(2024, 6, 15));
        assert_eq!(resolve("three_months", now), at(2024, 5, 15));
        assert_eq!(resolve("four_months", now), at(2024, 4, 15));
        assert_eq!(resolve("five_months", now), at(2024, 3, 15));
        assert_eq!(resolve("six_months", now), at(2024, 2, 15));
    }

    #[test]
    fn test_month_window_crosses_year() {
        assert_eq!(resolve("three_months", at(2024, 2, 10)), at(2023, 11, 10));
    }

    #[test]
    fn test_month_clamps_to_last_day() {
        assert_eq!(resolve("one_month", at(2024, 3, 31)), at(2024, 2, 29));
        assert_eq!(resolve("one_month", at(2023, 3, 31)), at(2023, 2, 28));
        assert_eq!(resolve("two_months", at(2024, 12, 31)), at(2024, 10, 31));
        assert_eq!(resolve("three_months", at(2024, 5, 31)), at(2024, 2, 29));
    }

    #[test]
    fn test_case_insensitive() {
        let now = at(2024, 8, 15);

        assert_eq!(resolve("ONE_MONTH", now), at(2024, 7, 15));
        assert_eq!(resolve("Six_Months", now), at(2024, 2, 15));
        assert_eq!(WindowToken::parse("Three_Weeks"), WindowToken::ThreeWeeks);
    }

    #[test]
    fn test_unrecognized_falls_back_to_one_week() {
        let now = at(2024, 8, 15);
        let week_ago = now - Duration::days(7);

        assert_eq!(resolve("", now), week_ago);
        assert_eq!(resolve("one_year", now), week_ago);
        assert_eq!(resolve(" one_month", now), week_ago);
        assert_eq!(WindowToken::recognize("fortnight"), None);
    }

    #[test]
    fn test_token_round_trip_names() {
        for token in WindowToken::all() {
            assert_eq!(WindowToken::parse(token.as_str()), *token);
            assert_eq!(token.to_string(), token.as_str());
        }
    }

    #[test]
    fn test_serde_names_match_tokens() {
        let json = serde_json::to_string(&WindowToken::FourMonths).unwrap();
        assert_eq!(json, "\"four_months\"");
    }
}
