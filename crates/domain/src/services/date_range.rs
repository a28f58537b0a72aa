//! Reporting window resolution.
//!
//! All calendar math is done in UTC. A resolved window always spans whole
//! days: it starts at 00:00:00.000 and ends at 23:59:59.999.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::models::{DateRange, RangeKeyword};
use crate::services::report_engine::ReportError;

/// First instant of a calendar day.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last millisecond of a calendar day. `None` for the last representable day.
pub fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.succ_opt()
        .map(start_of_day)
        .and_then(|next| next.checked_sub_signed(Duration::milliseconds(1)))
}

/// First and last calendar day of the month containing `date`.
///
/// The last day is "day zero" of the following month, so month length is
/// never hard-coded.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date - Duration::days(i64::from(date.day0()));
    // 31 days past the 1st always lands inside the next month.
    let into_next = first + Duration::days(31);
    let next_first = into_next - Duration::days(i64::from(into_next.day0()));
    (first, next_first - Duration::days(1))
}

fn out_of_bounds() -> ReportError {
    ReportError::InvalidRange("date is outside the supported range".to_string())
}

fn days_before(date: NaiveDate, days: u32) -> Result<NaiveDate, ReportError> {
    date.checked_sub_days(Days::new(u64::from(days)))
        .ok_or_else(out_of_bounds)
}

fn whole_days(
    first: NaiveDate,
    last: NaiveDate,
    label: RangeKeyword,
) -> Result<DateRange, ReportError> {
    let end = end_of_day(last).ok_or_else(out_of_bounds)?;
    Ok(DateRange {
        start: start_of_day(first),
        end,
        label,
    })
}

/// Widens two instants to whole days and checks their order.
pub fn normalize_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    label: RangeKeyword,
) -> Result<DateRange, ReportError> {
    let end = end_of_day(end.date_naive()).ok_or_else(out_of_bounds)?;
    DateRange::new(start_of_day(start.date_naive()), end, label)
        .ok_or_else(|| ReportError::InvalidRange("end date is before start date".to_string()))
}

/// Parses an optional date parameter, falling back to `default` when absent.
pub fn parse_bound(
    raw: Option<&str>,
    default: Option<DateTime<Utc>>,
) -> Result<DateTime<Utc>, ReportError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => shared::validation::parse_date_param(value)
            .ok_or_else(|| ReportError::InvalidRange(format!("unparseable date '{}'", value))),
        None => default.ok_or_else(|| ReportError::InvalidRange("missing date".to_string())),
    }
}

/// Resolves a keyword (and, for `Custom`, explicit bounds) into a window.
pub fn resolve_range(
    keyword: RangeKeyword,
    custom_start: Option<&str>,
    custom_end: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateRange, ReportError> {
    let today = now.date_naive();

    match keyword {
        RangeKeyword::Today => whole_days(today, today, keyword),
        RangeKeyword::Yesterday => {
            let yesterday = days_before(today, 1)?;
            whole_days(yesterday, yesterday, keyword)
        }
        RangeKeyword::Weekly => whole_days(days_before(today, 7)?, today, keyword),
        RangeKeyword::Monthly => {
            let (first, last) = month_bounds(today);
            whole_days(first, last, keyword)
        }
        RangeKeyword::Custom => {
            let start = parse_bound(custom_start, None)?;
            let end = parse_bound(custom_end, None)?;
            normalize_window(start, end, keyword)
        }
    }
}

/// Window covering the last `days` days up to and including today.
pub fn trailing_days(days: u32, now: DateTime<Utc>) -> Result<DateRange, ReportError> {
    let today = now.date_naive();
    whole_days(days_before(today, days)?, today, RangeKeyword::Custom)
}

/// How a route interprets the `range` keyword.
///
/// The versioned dashboard route rejects anything outside the known
/// keywords; the legacy route falls back to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Case-insensitive; unknown keywords resolve to `Today`.
    Lenient,
    /// Exact lowercase keywords only.
    #[default]
    Strict,
}

impl RangePolicy {
    pub fn parse_keyword(&self, raw: Option<&str>) -> Result<RangeKeyword, ReportError> {
        let Some(raw) = raw else {
            return Ok(RangeKeyword::Today);
        };

        match self {
            RangePolicy::Lenient => {
                let lowered = raw.trim().to_ascii_lowercase();
                Ok(RangeKeyword::ALL
                    .into_iter()
                    .find(|k| k.as_str() == lowered)
                    .unwrap_or(RangeKeyword::Today))
            }
            RangePolicy::Strict => RangeKeyword::ALL
                .into_iter()
                .find(|k| k.as_str() == raw)
                .ok_or_else(|| ReportError::UnknownRange(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 17, 42).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_whole_days(range: &DateRange) {
        assert_eq!(range.start.time(), NaiveTime::MIN);
        assert_eq!(range.end.hour(), 23);
        assert_eq!(range.end.minute(), 59);
        assert_eq!(range.end.second(), 59);
        assert_eq!(range.end.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn test_end_of_day() {
        let end = end_of_day(date(2024, 3, 9)).unwrap();
        assert_eq!(end.date_naive(), date(2024, 3, 9));
        assert_eq!(end + Duration::milliseconds(1), start_of_day(date(2024, 3, 10)));
    }

    #[test]
    fn test_today() {
        let now = at(2024, 6, 15, 9);
        let range = resolve_range(RangeKeyword::Today, None, None, now).unwrap();
        assert_whole_days(&range);
        assert_eq!(range.start.date_naive(), date(2024, 6, 15));
        assert_eq!(range.end.date_naive(), date(2024, 6, 15));
        assert!(range.contains(now));
        assert_eq!(range.label, RangeKeyword::Today);
    }

    #[test]
    fn test_yesterday_crosses_month_boundary() {
        let now = at(2024, 3, 1, 0);
        let range = resolve_range(RangeKeyword::Yesterday, None, None, now).unwrap();
        assert_whole_days(&range);
        assert_eq!(range.start.date_naive(), date(2024, 2, 29));
        assert_eq!(range.end.date_naive(), date(2024, 2, 29));
        assert!(!range.contains(now));
    }

    #[test]
    fn test_weekly_spans_eight_calendar_days() {
        let now = at(2024, 6, 15, 23);
        let range = resolve_range(RangeKeyword::Weekly, None, None, now).unwrap();
        assert_whole_days(&range);
        assert_eq!(range.start.date_naive(), date(2024, 6, 8));
        assert_eq!(range.end.date_naive(), date(2024, 6, 15));
    }

    #[test]
    fn test_monthly_leap_february() {
        let range = resolve_range(RangeKeyword::Monthly, None, None, at(2024, 2, 10, 5)).unwrap();
        assert_whole_days(&range);
        assert_eq!(range.start.date_naive(), date(2024, 2, 1));
        assert_eq!(range.end.date_naive(), date(2024, 2, 29));
    }

    #[test]
    fn test_monthly_non_leap_february() {
        let range = resolve_range(RangeKeyword::Monthly, None, None, at(2023, 2, 28, 5)).unwrap();
        assert_eq!(range.start.date_naive(), date(2023, 2, 1));
        assert_eq!(range.end.date_naive(), date(2023, 2, 28));
    }

    #[test]
    fn test_monthly_thirty_and_thirty_one_day_months() {
        let (_, last) = month_bounds(date(2024, 4, 30));
        assert_eq!(last, date(2024, 4, 30));
        let (first, last) = month_bounds(date(2024, 12, 31));
        assert_eq!(first, date(2024, 12, 1));
        assert_eq!(last, date(2024, 12, 31));
        let (_, last) = month_bounds(date(2024, 1, 1));
        assert_eq!(last, date(2024, 1, 31));
    }

    #[test]
    fn test_every_month_of_two_years() {
        for year in [2023, 2024] {
            for month in 1..=12 {
                let (first, last) = month_bounds(date(year, month, 15));
                assert_eq!(first.month(), month);
                assert_eq!(last.month(), month);
                assert_eq!((last + Duration::days(1)).day(), 1);
            }
        }
    }

    #[test]
    fn test_non_custom_ranges_are_ordered_and_contain_now() {
        let now = at(2024, 7, 31, 16);
        for keyword in [
            RangeKeyword::Today,
            RangeKeyword::Weekly,
            RangeKeyword::Monthly,
        ] {
            let range = resolve_range(keyword, None, None, now).unwrap();
            assert!(range.start <= range.end);
            assert!(range.contains(now), "{} should contain now", keyword);
        }
        let yesterday = resolve_range(RangeKeyword::Yesterday, None, None, now).unwrap();
        assert!(yesterday.start <= yesterday.end);
        assert!(yesterday.end < now);
    }

    #[test]
    fn test_custom_normalizes_bounds() {
        let range = resolve_range(
            RangeKeyword::Custom,
            Some("2024-01-05T13:00:00Z"),
            Some("2024-01-07"),
            at(2024, 6, 1, 0),
        )
        .unwrap();
        assert_whole_days(&range);
        assert_eq!(range.start.date_naive(), date(2024, 1, 5));
        assert_eq!(range.end.date_naive(), date(2024, 1, 7));
    }

    #[test]
    fn test_custom_same_day_is_valid() {
        let range = resolve_range(
            RangeKeyword::Custom,
            Some("2024-01-05"),
            Some("2024-01-05"),
            at(2024, 6, 1, 0),
        )
        .unwrap();
        assert!(range.start < range.end);
    }

    #[test]
    fn test_custom_unparseable_is_invalid_range() {
        let result = resolve_range(
            RangeKeyword::Custom,
            Some("not a date"),
            Some("2024-01-07"),
            at(2024, 6, 1, 0),
        );
        assert!(matches!(result, Err(ReportError::InvalidRange(_))));
    }

    #[test]
    fn test_custom_missing_bound_is_invalid_range() {
        let result = resolve_range(RangeKeyword::Custom, Some("2024-01-05"), None, at(2024, 6, 1, 0));
        assert!(matches!(result, Err(ReportError::InvalidRange(_))));
    }

    #[test]
    fn test_custom_inverted_is_invalid_range() {
        let result = resolve_range(
            RangeKeyword::Custom,
            Some("2024-01-07"),
            Some("2024-01-05"),
            at(2024, 6, 1, 0),
        );
        assert!(matches!(result, Err(ReportError::InvalidRange(_))));
    }

    #[test]
    fn test_trailing_days() {
        let range = trailing_days(30, at(2024, 3, 15, 8)).unwrap();
        assert_whole_days(&range);
        assert_eq!(range.start.date_naive(), date(2024, 2, 14));
        assert_eq!(range.end.date_naive(), date(2024, 3, 15));
    }

    #[test]
    fn test_last_representable_day_has_no_end() {
        assert!(end_of_day(NaiveDate::MAX).is_none());
        assert!(end_of_day(NaiveDate::MIN).is_some());
    }

    #[test]
    fn test_custom_far_future_is_invalid_range() {
        let last_day = NaiveDate::MAX.format("%Y-%m-%d").to_string();
        let result = resolve_range(
            RangeKeyword::Custom,
            Some("2024-01-01"),
            Some(&last_day),
            at(2024, 6, 1, 0),
        );
        match result {
            Err(ReportError::InvalidRange(msg)) => assert!(msg.contains("supported range")),
            other => panic!("Expected InvalidRange, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_days_overflow_is_invalid_range() {
        assert!(matches!(
            trailing_days(u32::MAX, at(2024, 3, 15, 8)),
            Err(ReportError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_parse_bound_default() {
        let now = at(2024, 3, 15, 8);
        assert_eq!(parse_bound(None, Some(now)).unwrap(), now);
        assert_eq!(parse_bound(Some("  "), Some(now)).unwrap(), now);
        assert!(parse_bound(Some("2024-99-01"), Some(now)).is_err());
    }

    #[test]
    fn test_lenient_policy() {
        let policy = RangePolicy::Lenient;
        assert_eq!(policy.parse_keyword(None).unwrap(), RangeKeyword::Today);
        assert_eq!(
            policy.parse_keyword(Some("WEEKLY")).unwrap(),
            RangeKeyword::Weekly
        );
        assert_eq!(
            policy.parse_keyword(Some("quarterly")).unwrap(),
            RangeKeyword::Today
        );
        assert_eq!(
            policy.parse_keyword(Some("custom")).unwrap(),
            RangeKeyword::Custom
        );
    }

    #[test]
    fn test_strict_policy() {
        let policy = RangePolicy::Strict;
        assert_eq!(policy.parse_keyword(None).unwrap(), RangeKeyword::Today);
        assert_eq!(
            policy.parse_keyword(Some("monthly")).unwrap(),
            RangeKeyword::Monthly
        );
        assert!(matches!(
            policy.parse_keyword(Some("Monthly")),
            Err(ReportError::UnknownRange(_))
        ));
        assert!(matches!(
            policy.parse_keyword(Some("quarterly")),
            Err(ReportError::UnknownRange(_))
        ));
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        let policy: RangePolicy = serde_json::from_str("\"lenient\"").unwrap();
        assert_eq!(policy, RangePolicy::Lenient);
        assert_eq!(RangePolicy::default(), RangePolicy::Strict);
    }
}
