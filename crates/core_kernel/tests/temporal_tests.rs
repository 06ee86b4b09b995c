//! Unit tests for the Temporal module
//!
//! Tests cover DateRange, ValidityWindow and PeriodType range computation
//! across month, year and week boundaries.

use chrono::{NaiveDate, Weekday};
use core_kernel::temporal::{full_years_between, DateRange, PeriodType, TemporalError, ValidityWindow};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod date_range {
    use super::*;

    #[test]
    fn test_new_rejects_inverted_range() {
        let result = DateRange::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::single_day(date(2024, 5, 5));
        assert_eq!(range.days(), 1);
        assert!(range.contains(date(2024, 5, 5)));
        assert!(!range.contains(date(2024, 5, 6)));
    }

    #[test]
    fn test_display() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(range.to_string(), "[2024-01-01, 2024-01-31]");
        assert_eq!(range.days(), 31);
    }
}

mod validity_window {
    use super::*;

    #[test]
    fn test_between_rejects_inverted_bounds() {
        assert!(ValidityWindow::between(date(2024, 6, 1), date(2024, 5, 1)).is_err());
    }

    #[test]
    fn test_open_end_window_contains_future_dates() {
        let window = ValidityWindow::starting(date(2020, 1, 1));
        assert!(window.contains(date(2030, 12, 31)));
    }

    #[test]
    fn test_window_deserializes_with_missing_bounds() {
        let window: ValidityWindow = serde_json::from_str("{}").unwrap();
        assert_eq!(window, ValidityWindow::unbounded());

        let window: ValidityWindow =
            serde_json::from_str(r#"{"effective_from": "2024-01-01"}"#).unwrap();
        assert!(window.contains(date(2024, 1, 1)));
        assert!(!window.contains(date(2023, 12, 31)));
    }
}

mod period_ranges {
    use super::*;

    #[test]
    fn test_daily_range_is_the_day_itself() {
        let range = PeriodType::Daily.range_containing(date(2024, 3, 9), Weekday::Mon);
        assert_eq!(range, DateRange::single_day(date(2024, 3, 9)));
    }

    #[test]
    fn test_weekly_range_spans_year_boundary() {
        // 2025-01-01 is a Wednesday
        let range = PeriodType::Weekly.range_containing(date(2025, 1, 1), Weekday::Mon);
        assert_eq!(range.start, date(2024, 12, 30));
        assert_eq!(range.end, date(2025, 1, 5));
    }

    #[test]
    fn test_weekly_range_on_week_start_day() {
        // 2024-06-10 is a Monday
        let range = PeriodType::Weekly.range_containing(date(2024, 6, 10), Weekday::Mon);
        assert_eq!(range.start, date(2024, 6, 10));
        assert_eq!(range.days(), 7);
    }

    #[test]
    fn test_monthly_range_for_december() {
        let range = PeriodType::Monthly.range_containing(date(2024, 12, 31), Weekday::Mon);
        assert_eq!(range.start, date(2024, 12, 1));
        assert_eq!(range.end, date(2024, 12, 31));
    }

    #[test]
    fn test_monthly_range_for_thirty_day_month() {
        let range = PeriodType::Monthly.range_containing(date(2024, 4, 1), Weekday::Mon);
        assert_eq!(range.end, date(2024, 4, 30));
    }

    #[test]
    fn test_yearly_range() {
        let range = PeriodType::Yearly.range_containing(date(2024, 7, 4), Weekday::Mon);
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 12, 31));
        assert_eq!(range.days(), 366);
    }

    #[test]
    fn test_period_parsing_is_lenient() {
        assert_eq!(PeriodType::from("MONTHLY"), PeriodType::Monthly);
        assert_eq!(PeriodType::from(" week "), PeriodType::Weekly);
        assert_eq!(PeriodType::from(""), PeriodType::Yearly);
        assert_eq!(PeriodType::default(), PeriodType::Yearly);
    }

    #[test]
    fn test_period_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PeriodType::Daily).unwrap(), "\"daily\"");
    }
}

mod elapsed_years {
    use super::*;

    #[test]
    fn test_birthday_on_leap_day() {
        assert_eq!(full_years_between(date(2000, 2, 29), date(2024, 2, 28)), 23);
        assert_eq!(full_years_between(date(2000, 2, 29), date(2024, 2, 29)), 24);
    }
}
