//! Snapshot document
//!
//! The serialized form of everything the engine reads: catalog, people,
//! coverage rules, discounts and usage history. Every list defaults to
//! empty so partial documents load.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use core_kernel::ItemId;
use domain_pricing::{
    CecItemDiscount, ConditionGroup, Employee, EmployeeSpecialDiscount, GroupMember, Item, PriceCondition,
    PriceRecord, SetItemDiscount, UsageRecord,
};

use crate::error::StoreError;

/// Reference data served by `InMemoryStore`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSnapshot {
    pub items: Vec<Item>,
    pub price_records: Vec<PriceRecord>,
    pub employees: Vec<Employee>,
    pub conditions: Vec<PriceCondition>,
    pub groups: Vec<ConditionGroup>,
    pub employee_special_discounts: Vec<EmployeeSpecialDiscount>,
    pub cec_item_discounts: Vec<CecItemDiscount>,
    pub set_item_discounts: Vec<SetItemDiscount>,
    pub usage_records: Vec<UsageRecord>,
}

impl PricingSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a snapshot file
    #[instrument(fields(path = %path.as_ref().display()), skip(path))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = Self::from_json_str(&raw)?;
        debug!(
            items = snapshot.items.len(),
            conditions = snapshot.conditions.len(),
            usage_records = snapshot.usage_records.len(),
            "Snapshot parsed"
        );
        Ok(snapshot)
    }

    /// Checks the snapshot for duplicate ids and dangling item references
    ///
    /// # Errors
    ///
    /// Returns the first integrity problem found
    pub fn validate(&self) -> Result<(), StoreError> {
        let item_ids = unique_ids("Item", self.items.iter().map(|item| item.id))?;
        unique_ids("PriceRecord", self.price_records.iter().map(|record| record.id))?;
        unique_ids("Employee", self.employees.iter().map(|employee| employee.id))?;
        unique_ids("PriceCondition", self.conditions.iter().map(|condition| condition.id))?;
        unique_ids("ConditionGroup", self.groups.iter().map(|group| group.id))?;
        unique_ids(
            "EmployeeSpecialDiscount",
            self.employee_special_discounts.iter().map(|discount| discount.terms.id),
        )?;
        unique_ids("CecItemDiscount", self.cec_item_discounts.iter().map(|discount| discount.terms.id))?;
        unique_ids("SetItemDiscount", self.set_item_discounts.iter().map(|discount| discount.terms.id))?;

        let require_item = |entity: &str, owner: &dyn Display, item_id: ItemId| {
            if item_ids.contains(&item_id) {
                Ok(())
            } else {
                Err(StoreError::dangling(entity, owner, item_id))
            }
        };

        for record in &self.price_records {
            require_item("PriceRecord", &record.id, record.item_id)?;
        }
        for condition in &self.conditions {
            if let Some(item_id) = condition.item_id {
                require_item("PriceCondition", &condition.id, item_id)?;
            }
        }
        for group in &self.groups {
            for member in &group.members {
                if let GroupMember::Item(item_id) = member {
                    require_item("ConditionGroup", &group.id, *item_id)?;
                }
            }
        }

        Ok(())
    }
}

/// Collects ids, failing on the first repeat
fn unique_ids<T>(entity: &str, ids: impl Iterator<Item = T>) -> Result<BTreeSet<T>, StoreError>
where
    T: Ord + Display,
{
    let mut seen = BTreeSet::new();
    for id in ids {
        if seen.contains(&id) {
            return Err(StoreError::duplicate(entity, id));
        }
        seen.insert(id);
    }
    Ok(seen)
}
