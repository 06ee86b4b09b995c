//! Pricing & Coverage Determination Domain
//!
//! This crate decides, for a billable medical item consumed by an insured
//! person, whether and how much the insurer covers. It is a pure library: all
//! reference data is read through the ports in [`ports`], and every operation
//! takes its reference date explicitly.
//!
//! # Architecture
//!
//! - **Model**: `Item`, `PriceRecord`, `Employee`, `PriceCondition` with its
//!   filters and restrictions, `ConditionGroup`, discount sources, `UsageRecord`
//! - **Components**: `UsageCounter`, `ConditionMatcher`, `ConflictChecker`,
//!   `GroupChecker`, `DiscountCalculator`, `RuleEngineAdapter`
//! - **Service**: `PricingService` orchestrates the components per line and
//!   per invoice
//!
//! # Failure posture
//!
//! ```text
//! rule expressions   -> fail open   (unusable rule passes)
//! unknown filters    -> fail open
//! restrictions       -> fail closed (line is Uncovered)
//! group caps         -> advisory    (warnings only)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_pricing::{PricingService, InvoiceLineRequest};
//!
//! let service = PricingService::new(&store);
//! let result = service.calculate(&item, &employee, 3, None, None, as_of);
//! println!("insurer pays {}", result.insurance_share);
//! ```

pub mod catalog;
pub mod employee;
pub mod condition;
pub mod group;
pub mod discount;
pub mod usage;
pub mod ports;
pub mod matcher;
pub mod conflict;
pub mod rules_engine;
pub mod result;
pub mod config;
pub mod error;
pub mod services;

pub use catalog::{Item, PriceRecord, resolve_price};
pub use employee::{Employee, Gender, InsuranceRecord, PRINCIPAL_RELATION};
pub use condition::{
    PriceCondition, ConditionFilter, ConditionRestriction, FilterType, FilterOperator, RestrictionType,
};
pub use group::{ConditionGroup, GroupMember, GroupChecker, GroupViolation};
pub use discount::{
    DiscountTerms, EmployeeSpecialDiscount, CecItemDiscount, SetItemDiscount, DiscountSource,
    DiscountSourceType, DiscountContext, DiscountInfo, DiscountCalculator,
};
pub use usage::{UsageRecord, InvoiceStatus, UsageCounter};
pub use ports::{CatalogPort, EmployeePort, ConditionPort, GroupPort, DiscountPort, UsagePort, PricingStore};
pub use matcher::{ConditionMatcher, filters_pass, filter_passes};
pub use conflict::{ConflictChecker, RestrictionViolation};
pub use rules_engine::{
    RuleEngineAdapter, RuleExpression, FeatureContext, FeatureValue, ComparisonOperator, Combinator, RulesError,
};
pub use result::{
    CoverageOutcome, PricingResult, PricingMetadata, InvoiceLineRequest, InvoicePricingResult, InvoiceSummary,
};
pub use config::PricingConfig;
pub use error::PricingError;
pub use services::PricingService;
