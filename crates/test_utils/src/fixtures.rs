//! Pre-built Test Fixtures
//!
//! Provides fixed reference data so scenarios are reproducible. Every engine
//! call takes its date explicitly, so tests pin `as_of` to these values.

use chrono::NaiveDate;
use core_kernel::{
    BodyPartId, CategoryId, ConditionId, CustomEmployeeCodeId, DiscountId, EmployeeId, IllnessId, InvoiceId,
    ItemId, PriceRecordId, ProvinceId,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for reference dates
pub struct DateFixtures;

impl DateFixtures {
    /// Builds a date from parts
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
    }

    /// The date most scenarios are priced on (a Saturday)
    pub fn as_of() -> NaiveDate {
        Self::date(2024, 6, 15)
    }

    /// Start of the fixture year
    pub fn year_start() -> NaiveDate {
        Self::date(2024, 1, 1)
    }

    /// A date in the previous calendar year
    pub fn last_year() -> NaiveDate {
        Self::date(2023, 11, 20)
    }

    /// Birth date giving an age of 34 on `as_of`
    pub fn adult_birth_date() -> NaiveDate {
        Self::date(1990, 3, 10)
    }

    /// Birth date giving an age of 8 on `as_of`
    pub fn child_birth_date() -> NaiveDate {
        Self::date(2016, 1, 5)
    }

    /// Employment start giving six years of tenure on `as_of`
    pub fn employment_date() -> NaiveDate {
        Self::date(2018, 2, 1)
    }

    /// `days` before `as_of`
    pub fn days_before_as_of(days: u64) -> NaiveDate {
        Self::as_of()
            .checked_sub_days(chrono::Days::new(days))
            .expect("fixture date in range")
    }
}

/// Fixture for monetary amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn unit_price() -> Decimal {
        dec!(100.00)
    }

    pub fn cheap_unit_price() -> Decimal {
        dec!(12.50)
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn item() -> ItemId {
        ItemId::new(1001)
    }

    pub fn other_item() -> ItemId {
        ItemId::new(1002)
    }

    pub fn conflicting_item() -> ItemId {
        ItemId::new(1003)
    }

    pub fn category() -> CategoryId {
        CategoryId::new(10)
    }

    pub fn employee() -> EmployeeId {
        EmployeeId::new(501)
    }

    pub fn condition() -> ConditionId {
        ConditionId::new(1)
    }

    pub fn price_record() -> PriceRecordId {
        PriceRecordId::new(1)
    }

    pub fn discount() -> DiscountId {
        DiscountId::new(1)
    }

    pub fn province() -> ProvinceId {
        ProvinceId::new(7)
    }

    pub fn cec() -> CustomEmployeeCodeId {
        CustomEmployeeCodeId::new(3)
    }

    pub fn illness() -> IllnessId {
        IllnessId::new(42)
    }

    pub fn knee() -> BodyPartId {
        BodyPartId::new(11)
    }

    pub fn invoice() -> InvoiceId {
        InvoiceId::new(9001)
    }
}
