//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Days, NaiveDate};
use core_kernel::PeriodType;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for unit prices between 0.01 and 10,000.00
pub fn unit_price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

/// Strategy for whole coverage percentages (0% to 100%)
pub fn coverage_percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=100u32).prop_map(Decimal::from)
}

/// Strategy for percentages with two decimals (0.00% to 100.00%)
pub fn fine_percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for requested line quantities
pub fn quantity_strategy() -> impl Strategy<Value = u32> {
    1u32..50u32
}

/// Strategy for period types
pub fn period_type_strategy() -> impl Strategy<Value = PeriodType> {
    prop_oneof![
        Just(PeriodType::Daily),
        Just(PeriodType::Weekly),
        Just(PeriodType::Monthly),
        Just(PeriodType::Yearly),
    ]
}

/// Strategy for dates in 2024
pub fn date_2024_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..366u64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|start| start.checked_add_days(Days::new(days)))
            .expect("date within 2024")
    })
}

/// Strategy for a period cap with prior usage at or below it
pub fn cap_and_usage_strategy() -> impl Strategy<Value = (u32, u32)> {
    (1u32..20u32).prop_flat_map(|cap| (Just(cap), 0u32..=cap))
}
