//! Core Kernel - Foundational types shared by the coverage pricing workspace
//!
//! This crate provides the building blocks used by the pricing engine and its
//! adapters:
//! - Decimal money helpers and percentage rates
//! - Validity windows and calendar period ranges
//! - Typed integer identifiers for store entities

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Rate, round_money, non_negative, extend, DEFAULT_MONEY_DP};
pub use temporal::{DateRange, ValidityWindow, PeriodType, TemporalError, full_years_between};
pub use identifiers::{
    ItemId, CategoryId, SubCategoryId, ItemGroupId, PriceRecordId, BodyPartId,
    EmployeeId, ProvinceId, LocationId, CustomEmployeeCodeId, SpecialEmployeeTypeId,
    IllnessId, InsuranceId, ConditionId, FilterId, RestrictionId, ConditionGroupId,
    DiscountId, InvoiceId,
};
pub use error::CoreError;
