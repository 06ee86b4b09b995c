//! In-memory pricing store
//!
//! `InMemoryStore` indexes a validated `PricingSnapshot` and implements every
//! read port of the pricing domain over it. Lookups pre-filter on activity,
//! validity and scope; the engine re-applies its own predicates, so a
//! superset would be equally correct.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use core_kernel::{CategoryId, CustomEmployeeCodeId, DateRange, EmployeeId, ItemId};
use domain_pricing::{
    CatalogPort, CecItemDiscount, ConditionGroup, ConditionPort, DiscountPort, Employee, EmployeePort,
    EmployeeSpecialDiscount, GroupPort, Item, PriceCondition, PriceRecord, SetItemDiscount, UsagePort,
    UsageRecord,
};

use crate::error::StoreError;
use crate::snapshot::PricingSnapshot;

/// Store adapter over an immutable snapshot
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    items: BTreeMap<ItemId, Item>,
    items_by_category: BTreeMap<CategoryId, Vec<ItemId>>,
    price_records: BTreeMap<ItemId, Vec<PriceRecord>>,
    employees: BTreeMap<EmployeeId, Employee>,
    conditions: Vec<PriceCondition>,
    groups: Vec<ConditionGroup>,
    employee_special_discounts: Vec<EmployeeSpecialDiscount>,
    cec_item_discounts: Vec<CecItemDiscount>,
    set_item_discounts: Vec<SetItemDiscount>,
    usage: BTreeMap<EmployeeId, Vec<UsageRecord>>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and indexes a snapshot
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot has duplicate ids or dangling references
    pub fn from_snapshot(snapshot: PricingSnapshot) -> Result<Self, StoreError> {
        snapshot.validate()?;

        let mut store = Self::new();
        for item in snapshot.items {
            if let Some(category) = item.category_id {
                store.items_by_category.entry(category).or_default().push(item.id);
            }
            store.items.insert(item.id, item);
        }
        for record in snapshot.price_records {
            store.price_records.entry(record.item_id).or_default().push(record);
        }
        for employee in snapshot.employees {
            store.employees.insert(employee.id, employee);
        }
        for record in snapshot.usage_records {
            store.usage.entry(record.employee_id).or_default().push(record);
        }
        store.conditions = snapshot.conditions;
        store.groups = snapshot.groups;
        store.employee_special_discounts = snapshot.employee_special_discounts;
        store.cec_item_discounts = snapshot.cec_item_discounts;
        store.set_item_discounts = snapshot.set_item_discounts;

        info!(
            items = store.items.len(),
            employees = store.employees.len(),
            conditions = store.conditions.len(),
            groups = store.groups.len(),
            "Pricing store loaded"
        );
        Ok(store)
    }

    /// Parses, validates and indexes a JSON snapshot
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        Self::from_snapshot(PricingSnapshot::from_json_str(json)?)
    }

    /// Reads, validates and indexes a snapshot file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_snapshot(PricingSnapshot::from_path(path)?)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }
}

impl CatalogPort for InMemoryStore {
    fn item(&self, id: ItemId) -> Option<Item> {
        self.items.get(&id).cloned()
    }

    fn item_ids_in_category(&self, category_id: CategoryId) -> Vec<ItemId> {
        self.items_by_category.get(&category_id).cloned().unwrap_or_default()
    }

    fn price_records(&self, item_id: ItemId, as_of: NaiveDate) -> Vec<PriceRecord> {
        self.price_records
            .get(&item_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.is_effective_on(as_of))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl EmployeePort for InMemoryStore {
    fn employee(&self, id: EmployeeId) -> Option<Employee> {
        self.employees.get(&id).cloned()
    }
}

impl ConditionPort for InMemoryStore {
    fn candidate_conditions(&self, item: &Item, as_of: NaiveDate) -> Vec<PriceCondition> {
        self.conditions
            .iter()
            .filter(|condition| condition.is_effective_on(as_of) && condition.scope_matches(item))
            .cloned()
            .collect()
    }
}

impl GroupPort for InMemoryStore {
    fn active_groups(&self) -> Vec<ConditionGroup> {
        self.groups.iter().filter(|group| group.is_active).cloned().collect()
    }
}

impl DiscountPort for InMemoryStore {
    fn employee_special_discounts(&self, employee_id: EmployeeId, as_of: NaiveDate) -> Vec<EmployeeSpecialDiscount> {
        self.employee_special_discounts
            .iter()
            .filter(|discount| discount.employee_id == employee_id && discount.terms.is_effective_on(as_of))
            .cloned()
            .collect()
    }

    fn cec_item_discounts(&self, code_id: CustomEmployeeCodeId, as_of: NaiveDate) -> Vec<CecItemDiscount> {
        self.cec_item_discounts
            .iter()
            .filter(|discount| discount.custom_employee_code_id == code_id && discount.terms.is_effective_on(as_of))
            .cloned()
            .collect()
    }

    fn set_item_discounts(&self, as_of: NaiveDate) -> Vec<SetItemDiscount> {
        self.set_item_discounts
            .iter()
            .filter(|discount| discount.terms.is_effective_on(as_of))
            .cloned()
            .collect()
    }
}

impl UsagePort for InMemoryStore {
    fn usage_records(&self, employee_id: EmployeeId, range: DateRange) -> Vec<UsageRecord> {
        self.usage
            .get(&employee_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| range.contains(record.invoice_date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
