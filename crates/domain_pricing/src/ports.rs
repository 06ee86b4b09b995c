//! Pricing Domain Ports
//!
//! This module defines the read-only interfaces the pricing engine needs from
//! its data store. The engine is synchronous and owns no state: every lookup
//! is answered from whatever snapshot the adapter holds at call time.
//!
//! # Architecture
//!
//! Each port covers one collaborator lookup. Adapters may pre-filter
//! (active flag, validity window, scope) or return supersets; the engine
//! re-applies every predicate itself, so both are correct.
//!
//! - **In-memory adapter**: `infra_store::InMemoryStore` over a JSON snapshot
//! - **Database adapter**: out of scope for this workspace
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_pricing::{PricingService, PricingConfig};
//!
//! let store = InMemoryStore::from_snapshot(snapshot)?;
//! let service = PricingService::with_config(&store, PricingConfig::default())?;
//! let result = service.calculate(&item, &employee, 3, None, None, as_of);
//! ```

use chrono::NaiveDate;

use core_kernel::{CategoryId, CustomEmployeeCodeId, DateRange, EmployeeId, ItemId};

use crate::catalog::{Item, PriceRecord};
use crate::condition::PriceCondition;
use crate::discount::{CecItemDiscount, EmployeeSpecialDiscount, SetItemDiscount};
use crate::employee::Employee;
use crate::group::ConditionGroup;
use crate::usage::UsageRecord;

/// Item and price list lookups
pub trait CatalogPort {
    /// Retrieves an item by id
    fn item(&self, id: ItemId) -> Option<Item>;

    /// Ids of every item classified under the category
    fn item_ids_in_category(&self, category: CategoryId) -> Vec<ItemId>;

    /// Price records for an item that may be in force on `as_of`
    fn price_records(&self, item: ItemId, as_of: NaiveDate) -> Vec<PriceRecord>;
}

/// Insured person lookups
pub trait EmployeePort {
    /// Retrieves an employee by id, with illnesses and active insurance
    fn employee(&self, id: EmployeeId) -> Option<Employee>;
}

/// Coverage condition lookups
pub trait ConditionPort {
    /// Conditions that may apply to the item on `as_of`
    ///
    /// Filters and restrictions must be populated on each condition.
    fn candidate_conditions(&self, item: &Item, as_of: NaiveDate) -> Vec<PriceCondition>;
}

/// Condition group lookups
pub trait GroupPort {
    /// Groups with their members populated
    fn active_groups(&self) -> Vec<ConditionGroup>;
}

/// Discount source lookups, one per ranked variant
pub trait DiscountPort {
    fn employee_special_discounts(
        &self,
        employee: EmployeeId,
        as_of: NaiveDate,
    ) -> Vec<EmployeeSpecialDiscount>;

    fn cec_item_discounts(
        &self,
        code: CustomEmployeeCodeId,
        as_of: NaiveDate,
    ) -> Vec<CecItemDiscount>;

    fn set_item_discounts(&self, as_of: NaiveDate) -> Vec<SetItemDiscount>;
}

/// Historical consumption lookups
pub trait UsagePort {
    /// Invoice line facts for the employee dated within `range`
    ///
    /// May include draft and rejected invoices; the engine excludes them.
    fn usage_records(&self, employee: EmployeeId, range: DateRange) -> Vec<UsageRecord>;
}

/// Everything the pricing engine reads
pub trait PricingStore:
    CatalogPort + EmployeePort + ConditionPort + GroupPort + DiscountPort + UsagePort
{
}

impl<T: ?Sized> PricingStore for T where
    T: CatalogPort + EmployeePort + ConditionPort + GroupPort + DiscountPort + UsagePort
{
}
